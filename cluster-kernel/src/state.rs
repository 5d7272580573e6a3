use parking_lot::Mutex;
use std::sync::Arc;

// Un seul writer à la fois sur pool + ledger : la registration verrouille
// le service complet pendant toute la requête.
pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
