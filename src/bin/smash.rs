use anyhow::Result;

fn main() -> Result<()> {
    smash::cli::run()
}
