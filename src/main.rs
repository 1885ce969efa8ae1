use anyhow::Result;

fn main() -> Result<()> {
    pulse_tui::cli::run()
}
