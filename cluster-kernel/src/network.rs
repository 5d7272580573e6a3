/**
 * NETWORK FACTS - Introspection de l'interface réseau du cluster
 *
 * RÔLE : Interroger l'OS (`ip -4 -br addr show`) pour connaître le sous-réseau
 * et l'adresse propre de l'interface gérée par dnsmasq. Ces deux faits servent
 * uniquement au calcul initial du pool d'adresses disponibles.
 */

use crate::errors::KernelError;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::process::Command;

/// Sous-réseau configuré + adresse propre de l'interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceFacts {
    pub network: Ipv4Net,
    pub address: Ipv4Addr,
}

/// Résout le sous-réseau et l'adresse IPv4 de l'interface donnée.
/// Interface vide, commande `ip` en échec ou absence d'IPv4 : tous trois
/// rendent l'interface irrésolvable, distinction faite avec les erreurs
/// de parsing de dnsmasq.conf.
pub fn interface_facts(iface: &str) -> Result<InterfaceFacts, KernelError> {
    if iface.is_empty() {
        return Err(KernelError::Configuration(
            "no dnsmasq interface configured".to_string(),
        ));
    }

    let output = Command::new("ip")
        .args(["-4", "-br", "addr", "show", "dev", iface])
        .output()
        .map_err(|e| KernelError::ExternalProcess(format!("failed to run ip: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KernelError::ExternalProcess(format!(
            "ip addr show {} failed: {}",
            iface,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_facts(&stdout).ok_or_else(|| {
        KernelError::Configuration(format!("no IPv4 address found on {}", iface))
    })
}

/// Premier token CIDR IPv4 de la sortie de `ip -4 -br addr show`.
/// Exemple de sortie : "enp0s9  UP  172.16.0.1/24"
fn parse_facts(output: &str) -> Option<InterfaceFacts> {
    for token in output.split_whitespace() {
        if !token.contains('/') {
            continue;
        }
        if let Ok(net) = token.parse::<Ipv4Net>() {
            return Some(InterfaceFacts {
                network: net.trunc(),
                address: net.addr(),
            });
        }
    }
    None
}
