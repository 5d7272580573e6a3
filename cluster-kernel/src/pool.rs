/**
 * AVAILABLE IP POOL - File d'adresses attribuables aux nouveaux nœuds
 *
 * RÔLE : Calculer une fois au démarrage l'ensemble des adresses attribuables
 * (hôtes du sous-réseau moins l'adresse du kernel moins les plages dynamiques)
 * puis le persister. Entre deux redémarrages le fichier est la seule source
 * de vérité : le pool ne fait que rétrécir, une adresse poppée ne revient pas.
 *
 * FONCTIONNEMENT : snapshot texte, une adresse par ligne, ordre croissant.
 * pop() = lire tout, retirer la première, réécrire le reste (FIFO).
 */

use crate::dnsmasq::DhcpRange;
use crate::errors::KernelError;
use crate::store::LineStore;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Adresses attribuables : hôtes du sous-réseau (network/broadcast exclus),
/// moins l'adresse de l'interface, moins toute adresse couverte par une plage
/// dynamique. Résultat trié croissant, sans doublons.
pub fn compute_available(
    network: Ipv4Net,
    iface_addr: Ipv4Addr,
    ranges: &[DhcpRange],
) -> Vec<Ipv4Addr> {
    network
        .hosts()
        .filter(|ip| *ip != iface_addr)
        .filter(|ip| !ranges.iter().any(|range| range.contains(*ip)))
        .collect()
}

pub struct AvailableIpPool {
    store: Box<dyn LineStore>,
}

impl AvailableIpPool {
    pub fn new(store: Box<dyn LineStore>) -> Self {
        Self { store }
    }

    /// Écrit le snapshot complet du pool (écrase l'existant, idempotent).
    pub fn persist(&self, ips: &[Ipv4Addr]) -> Result<(), KernelError> {
        let lines: Vec<String> = ips.iter().map(|ip| ip.to_string()).collect();
        self.store.write_lines(&lines)
    }

    /// Retire et retourne la première adresse du snapshot, puis persiste le
    /// reste. Pool vide : PoolExhausted, fichier laissé intact. Les lignes
    /// non parsables sont ignorées silencieusement.
    pub fn pop(&self) -> Result<Ipv4Addr, KernelError> {
        let mut ips: Vec<Ipv4Addr> = self
            .store
            .read_lines()?
            .iter()
            .filter_map(|line| line.parse().ok())
            .collect();

        if ips.is_empty() {
            return Err(KernelError::PoolExhausted);
        }

        let ip = ips.remove(0);
        self.persist(&ips)?;
        Ok(ip)
    }
}
