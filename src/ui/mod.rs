pub mod chapter_picker;
pub mod chat_loop;
