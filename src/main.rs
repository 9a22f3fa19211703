use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    ragbook::cli::main()
}
