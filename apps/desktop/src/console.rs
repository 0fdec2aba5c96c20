//! Line-based control surface on stdin.

use nosilence_application::{dispatch, CommandOutcome};
use nosilence_settings::Settings;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Read commands from stdin on a dedicated thread until `quit` or EOF.
pub fn spawn(settings: Arc<Settings>, quit: UnboundedSender<()>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        println!("Type 'help' for commands.");

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("stdin read failed: {}", e);
                    break;
                }
            };

            match dispatch(&settings, &line) {
                Ok(None) => {}
                Ok(Some(CommandOutcome::Updated(message))) => {
                    tracing::info!("{}", message);
                }
                Ok(Some(CommandOutcome::Info(text))) => println!("{}", text),
                Ok(Some(CommandOutcome::Quit)) => {
                    let _ = quit.send(());
                    return;
                }
                Err(e) => println!("{}", e),
            }
        }

        // EOF (e.g. stdin closed when running as a service): keep monitoring
        // until a signal arrives.
        tracing::debug!("console input closed");
    })
}
