use std::path::PathBuf;

/// Chemins du kernel, dérivés de l'environnement (pas de globals cachés :
/// la struct est passée explicitement aux constructeurs).
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Configuration dnsmasq lue au démarrage (interface + dhcp-range)
    pub dnsmasq_config: PathBuf,
    /// Fichier de réservations statiques (append-only)
    pub static_dhcp_config: PathBuf,
    /// Snapshot des adresses IP encore disponibles
    pub available_ips_file: PathBuf,
}

pub fn load_config() -> KernelConfig {
    KernelConfig {
        dnsmasq_config: env_path("DNSMASQ_CONFIG", "/etc/dnsmasq.conf"),
        static_dhcp_config: env_path("STATIC_DHCP_CONFIG", "/etc/dnsmasq.d/static_dhcp.conf"),
        available_ips_file: env_path("AVAILABLE_IPS_FILE", "/run/cluster-control/available_ips.txt"),
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).unwrap_or_else(|_| default.to_string()).into()
}
