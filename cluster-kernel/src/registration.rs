/**
 * REGISTRATION SERVICE - Enregistrement d'un nouveau nœud du cluster
 *
 * RÔLE : Orchestrer une registration complète : pop d'une adresse du pool,
 * calcul du prochain nom de nœud, append de la réservation, puis restart de
 * dnsmasq pour prendre en compte la nouvelle entrée.
 *
 * Le restart est best-effort : le fichier de réservations fait autorité, un
 * reload manuel ou planifié rattrapera un restart raté. Un crash entre pop et
 * append perd l'adresse poppée définitivement (limitation connue, single-writer).
 */

use crate::errors::KernelError;
use crate::ledger::ReservationLedger;
use crate::pool::AvailableIpPool;
use std::net::Ipv4Addr;
use std::process::Command;

/// Résultat d'une registration réussie
#[derive(Debug, Clone)]
pub struct Registration {
    pub mac: String,
    pub node_name: String,
    pub ip: Ipv4Addr,
}

pub struct RegistrationService {
    pool: AvailableIpPool,
    ledger: ReservationLedger,
    reload_command: Vec<String>,
}

impl RegistrationService {
    pub fn new(pool: AvailableIpPool, ledger: ReservationLedger) -> Self {
        Self {
            pool,
            ledger,
            reload_command: ["sudo", "systemctl", "restart", "dnsmasq"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Remplace la commande de reload dnsmasq (utilisé par les tests).
    pub fn with_reload_command(mut self, command: &[&str]) -> Self {
        self.reload_command = command.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Registration complète d'un nœud identifié par sa MAC.
    /// Toute erreur avant le restart annule la requête ; un restart raté est
    /// seulement loggé, la réservation écrite reste valide.
    pub fn register(&self, mac: &str) -> Result<Registration, KernelError> {
        let mac = normalize_mac(mac)?;
        let ip = self.pool.pop()?;
        let node_name = self.ledger.next_name()?;
        self.ledger.append(&mac, &node_name, ip)?;
        println!("[register] reserved {} for {} as {}", ip, mac, node_name);

        self.restart_dnsmasq();

        Ok(Registration { mac, node_name, ip })
    }

    fn restart_dnsmasq(&self) {
        let Some((program, args)) = self.reload_command.split_first() else {
            return;
        };
        match Command::new(program).args(args).output() {
            Ok(output) if output.status.success() => {
                println!("[register] dnsmasq restarted successfully");
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                eprintln!("[register] failed to restart dnsmasq: {}", stderr.trim());
            }
            Err(e) => {
                eprintln!("[register] failed to run {}: {}", program, e);
            }
        }
    }
}

/// Valide et normalise une adresse MAC : exactement 12 chiffres hexadécimaux,
/// rendus en minuscules séparés par des deux-points.
pub fn normalize_mac(mac: &str) -> Result<String, KernelError> {
    let hex: String = mac
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect::<String>()
        .to_ascii_lowercase();
    if hex.len() != 12 {
        return Err(KernelError::InvalidMac(mac.to_string()));
    }
    let pairs: Vec<&str> = (0..6).map(|i| &hex[i * 2..i * 2 + 2]).collect();
    Ok(pairs.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use std::net::Ipv4Addr;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn addr(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    struct Fixture {
        service: RegistrationService,
        pool_path: PathBuf,
        ledger_path: PathBuf,
    }

    fn fixture(dir: &tempfile::TempDir, pool_ips: &[&str], reload: &[&str]) -> Fixture {
        let pool_path = dir.path().join("available_ips.txt");
        let ledger_path = dir.path().join("static_dhcp.conf");

        let pool = AvailableIpPool::new(Box::new(FileStore::new(pool_path.clone())));
        let ips: Vec<Ipv4Addr> = pool_ips.iter().map(|s| addr(s)).collect();
        pool.persist(&ips).unwrap();

        let ledger = ReservationLedger::new(Box::new(FileStore::new(ledger_path.clone())));
        let service = RegistrationService::new(pool, ledger).with_reload_command(reload);

        Fixture {
            service,
            pool_path,
            ledger_path,
        }
    }

    #[test]
    fn test_register_appends_reservation_and_drains_pool() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &["172.16.0.2"], &["true"]);

        let reg = fx.service.register("aa:bb:cc:dd:ee:ff").unwrap();

        assert_eq!(reg.mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(reg.node_name, "jetson_0");
        assert_eq!(reg.ip, addr("172.16.0.2"));
        assert_eq!(
            std::fs::read_to_string(&fx.ledger_path).unwrap(),
            "dhcp-host=aa:bb:cc:dd:ee:ff,jetson_0, 172.16.0.2\n"
        );
        assert_eq!(std::fs::read_to_string(&fx.pool_path).unwrap(), "");
    }

    #[test]
    fn test_register_numbers_nodes_sequentially() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &["10.0.0.2", "10.0.0.3"], &["true"]);

        let first = fx.service.register("aa:bb:cc:dd:ee:01").unwrap();
        let second = fx.service.register("aa:bb:cc:dd:ee:02").unwrap();

        assert_eq!(first.node_name, "jetson_0");
        assert_eq!(second.node_name, "jetson_1");
        assert_eq!(second.ip, addr("10.0.0.3"));
    }

    #[test]
    fn test_register_succeeds_even_if_reload_fails() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &["10.0.0.2"], &["false"]);

        // restart raté = loggé seulement, la réservation écrite fait foi
        let reg = fx.service.register("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(reg.node_name, "jetson_0");
        assert!(std::fs::read_to_string(&fx.ledger_path)
            .unwrap()
            .contains("jetson_0"));
    }

    #[test]
    fn test_register_succeeds_when_reload_command_is_missing() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &["10.0.0.2"], &["/nonexistent/reload-helper"]);
        assert!(fx.service.register("aa:bb:cc:dd:ee:ff").is_ok());
    }

    #[test]
    fn test_register_on_exhausted_pool_touches_nothing() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &[], &["true"]);

        assert!(matches!(
            fx.service.register("aa:bb:cc:dd:ee:ff"),
            Err(KernelError::PoolExhausted)
        ));
        assert!(!fx.ledger_path.exists());
    }

    #[test]
    fn test_register_rejects_invalid_mac_before_popping() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &["10.0.0.2"], &["true"]);

        assert!(matches!(
            fx.service.register("not-a-mac"),
            Err(KernelError::InvalidMac(_))
        ));
        // le pool n'a pas bougé
        assert_eq!(
            std::fs::read_to_string(&fx.pool_path).unwrap(),
            "10.0.0.2\n"
        );
    }

    #[test]
    fn test_register_stops_on_corrupt_ledger() {
        let dir = tempdir().unwrap();
        let fx = fixture(&dir, &["10.0.0.2"], &["true"]);
        std::fs::write(&fx.ledger_path, "dhcp-host=aa:bb:cc:dd:ee:01,jetson_x, 10.0.0.9\n")
            .unwrap();

        assert!(matches!(
            fx.service.register("aa:bb:cc:dd:ee:ff"),
            Err(KernelError::CorruptLedger(_))
        ));
        // l'adresse poppée avant la détection est perdue (limitation documentée)
        assert_eq!(std::fs::read_to_string(&fx.pool_path).unwrap(), "");
    }

    #[test]
    fn test_normalize_mac_accepts_common_formats() {
        assert_eq!(
            normalize_mac("AA-BB-CC-DD-EE-FF").unwrap(),
            "aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(
            normalize_mac("aa:bb:cc:dd:ee:ff").unwrap(),
            "aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(
            normalize_mac("aabbccddeeff").unwrap(),
            "aa:bb:cc:dd:ee:ff"
        );
    }

    #[test]
    fn test_normalize_mac_rejects_bad_lengths() {
        assert!(normalize_mac("").is_err());
        assert!(normalize_mac("aa:bb:cc:dd:ee").is_err());
        assert!(normalize_mac("aa:bb:cc:dd:ee:ff:00").is_err());
    }
}
