/**
 * RESERVATION LEDGER - Réservations DHCP statiques des nœuds du cluster
 *
 * RÔLE : Fichier append-only de lignes `dhcp-host=<mac>,<nom>, <ip>` lues par
 * dnsmasq. Le ledger ne réécrit ni ne supprime jamais une entrée ; le nom du
 * prochain nœud est déduit du suffixe numérique de la dernière ligne.
 *
 * Le parsing du suffixe est STRICT (contrairement au reste du kernel) : un
 * dernier nom illisible arrête tout, car un mauvais numéro risquerait une
 * collision MAC/IP dans dnsmasq.
 */

use crate::dnsmasq::strip_comment;
use crate::errors::KernelError;
use crate::store::LineStore;
use std::net::Ipv4Addr;

/// Préfixe des noms de nœuds (jetson_0, jetson_1, ...)
const NODE_BASE_NAME: &str = "jetson";

pub struct ReservationLedger {
    store: Box<dyn LineStore>,
}

impl ReservationLedger {
    pub fn new(store: Box<dyn LineStore>) -> Self {
        Self { store }
    }

    /// Nom du prochain nœud : suffixe de la dernière entrée + 1, ou jetson_0
    /// si le store est vide. Dernière entrée illisible : CorruptLedger.
    pub fn next_name(&self) -> Result<String, KernelError> {
        let lines = self.store.read_lines()?;
        let entries: Vec<&str> = lines
            .iter()
            .map(|line| strip_comment(line))
            .filter(|line| !line.is_empty())
            .collect();

        let Some(last) = entries.last() else {
            return Ok(format!("{}_0", NODE_BASE_NAME));
        };

        let name = last
            .split(',')
            .nth(1)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                KernelError::CorruptLedger(format!("no node name in last entry: {:?}", last))
            })?;

        let suffix = name.rsplit_once('_').map(|(_, suffix)| suffix).ok_or_else(|| {
            KernelError::CorruptLedger(format!("node name without numeric suffix: {:?}", name))
        })?;

        let index: u64 = suffix.parse().map_err(|_| {
            KernelError::CorruptLedger(format!("non-numeric node suffix: {:?}", name))
        })?;

        Ok(format!("{}_{}", NODE_BASE_NAME, index + 1))
    }

    /// Ajoute une réservation en fin de store (créé si absent).
    /// L'espace avant l'IP est voulu : compatibilité avec le format existant.
    pub fn append(&self, mac: &str, name: &str, ip: Ipv4Addr) -> Result<(), KernelError> {
        self.store
            .append_line(&format!("dhcp-host={},{}, {}", mac, name, ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use tempfile::tempdir;

    fn ledger_at(dir: &tempfile::TempDir) -> (ReservationLedger, std::path::PathBuf) {
        let path = dir.path().join("static_dhcp.conf");
        (
            ReservationLedger::new(Box::new(FileStore::new(path.clone()))),
            path,
        )
    }

    #[test]
    fn test_next_name_on_empty_store() {
        let dir = tempdir().unwrap();
        let (ledger, _) = ledger_at(&dir);
        assert_eq!(ledger.next_name().unwrap(), "jetson_0");
    }

    #[test]
    fn test_next_name_increments_last_suffix() {
        let dir = tempdir().unwrap();
        let (ledger, path) = ledger_at(&dir);
        std::fs::write(
            &path,
            "dhcp-host=aa:bb:cc:dd:ee:01,jetson_0, 172.16.0.2\n\
             dhcp-host=aa:bb:cc:dd:ee:02,jetson_7, 172.16.0.3\n",
        )
        .unwrap();
        assert_eq!(ledger.next_name().unwrap(), "jetson_8");
    }

    #[test]
    fn test_next_name_ignores_comments_and_blank_lines() {
        let dir = tempdir().unwrap();
        let (ledger, path) = ledger_at(&dir);
        std::fs::write(
            &path,
            "# réservations générées par cluster-kernel\n\
             dhcp-host=aa:bb:cc:dd:ee:01,jetson_2, 172.16.0.2  ; premier nœud\n\
             \n",
        )
        .unwrap();
        assert_eq!(ledger.next_name().unwrap(), "jetson_3");
    }

    #[test]
    fn test_next_name_missing_name_field_is_corrupt() {
        let dir = tempdir().unwrap();
        let (ledger, path) = ledger_at(&dir);
        std::fs::write(&path, "dhcp-host=aa:bb:cc:dd:ee:01,jetson,\n").unwrap();
        // "jetson," : champ nom présent mais sans suffixe numérique
        assert!(matches!(
            ledger.next_name(),
            Err(KernelError::CorruptLedger(_))
        ));
    }

    #[test]
    fn test_next_name_non_numeric_suffix_is_corrupt() {
        let dir = tempdir().unwrap();
        let (ledger, path) = ledger_at(&dir);
        std::fs::write(&path, "dhcp-host=aa:bb:cc:dd:ee:01,jetson_abc, 172.16.0.2\n").unwrap();
        assert!(matches!(
            ledger.next_name(),
            Err(KernelError::CorruptLedger(_))
        ));
    }

    #[test]
    fn test_next_name_line_without_second_field_is_corrupt() {
        let dir = tempdir().unwrap();
        let (ledger, path) = ledger_at(&dir);
        std::fs::write(&path, "dhcp-host=aa:bb:cc:dd:ee:01\n").unwrap();
        assert!(matches!(
            ledger.next_name(),
            Err(KernelError::CorruptLedger(_))
        ));
    }

    #[test]
    fn test_append_writes_expected_line() {
        let dir = tempdir().unwrap();
        let (ledger, path) = ledger_at(&dir);

        ledger
            .append("aa:bb:cc:dd:ee:ff", "jetson_0", "172.16.100.10".parse().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "dhcp-host=aa:bb:cc:dd:ee:ff,jetson_0, 172.16.100.10\n");
    }

    #[test]
    fn test_append_then_next_name_chains() {
        let dir = tempdir().unwrap();
        let (ledger, _) = ledger_at(&dir);

        for expected in ["jetson_0", "jetson_1", "jetson_2"] {
            let name = ledger.next_name().unwrap();
            assert_eq!(name, expected);
            ledger
                .append("aa:bb:cc:dd:ee:ff", &name, "172.16.0.2".parse().unwrap())
                .unwrap();
        }
    }
}
