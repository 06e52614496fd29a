use storage::Database;
use storage::services::notifier::MailNotifier;
use storage::services::replacement::ReplacementMode;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: MailNotifier,
    pub replacement_mode: ReplacementMode,
}
