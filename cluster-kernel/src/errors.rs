/// Erreurs possibles lors des opérations du kernel (pool, ledger, registration)
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no available IPs left")]
    PoolExhausted,
    #[error("corrupt reservation store: {0}")]
    CorruptLedger(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("external command failed: {0}")]
    ExternalProcess(String),
    #[error("invalid mac address: {0}")]
    InvalidMac(String),
}
