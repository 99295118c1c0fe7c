fn main() -> Result<(), Box<dyn std::error::Error>> {
    refscope_cli::run()
}
