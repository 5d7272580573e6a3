/**
 * HEALTH CHECKS - État de santé du cluster exposé sur /health
 *
 * RÔLE : Chaque check est une capacité nommée (name + check booléen) ; le
 * registre les exécute tous et rend une map nom -> "OK"/"Failure!". Les checks
 * interrogent des collaborateurs externes (pemmican, systemctl, ping), un
 * échec de commande compte comme Failure, jamais comme erreur HTTP.
 */

use crate::store::LineStore;
use std::collections::BTreeMap;
use std::process::Command;

/// Marqueur émis par pemmican quand l'alimentation est sous-dimensionnée
const UNDERPOWERED_MARKER: &str = "This power supply is not capable of supplying 5A;";

/// Capacité commune de tous les health checks
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self) -> bool;
}

pub struct CheckRegistry {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn register<C: HealthCheck + 'static>(&mut self, check: C) {
        self.checks.push(Box::new(check));
    }

    /// Exécute tous les checks, dans une map triée pour une sortie stable.
    pub fn run_all(&self) -> BTreeMap<String, String> {
        self.checks
            .iter()
            .map(|check| {
                let verdict = if check.check() { "OK" } else { "Failure!" };
                (check.name().to_string(), verdict.to_string())
            })
            .collect()
    }
}

/// Alimentation suffisante (Raspberry Pi) : pemmican ne doit pas signaler
/// une alim incapable de fournir 5A.
pub struct SufficientPowerCheck;

impl HealthCheck for SufficientPowerCheck {
    fn name(&self) -> &str {
        "sufficient power check"
    }

    fn check(&self) -> bool {
        match Command::new("pemmican").output() {
            Ok(output) => {
                !String::from_utf8_lossy(&output.stdout).contains(UNDERPOWERED_MARKER)
            }
            Err(_) => false,
        }
    }
}

/// Le démon dnsmasq tourne (systemd)
pub struct DnsmasqActiveCheck;

impl HealthCheck for DnsmasqActiveCheck {
    fn name(&self) -> &str {
        "dnsmasq active check"
    }

    fn check(&self) -> bool {
        Command::new("systemctl")
            .args(["is-active", "--quiet", "dnsmasq"])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Tous les nœuds réservés répondent au ping
pub struct NodeConnectivityCheck {
    reservations: Box<dyn LineStore>,
}

impl NodeConnectivityCheck {
    pub fn new(reservations: Box<dyn LineStore>) -> Self {
        Self { reservations }
    }
}

impl HealthCheck for NodeConnectivityCheck {
    fn name(&self) -> &str {
        "node connectivity check"
    }

    fn check(&self) -> bool {
        let Ok(lines) = self.reservations.read_lines() else {
            return false;
        };
        reserved_ips(&lines).iter().all(|ip| ping(ip))
    }
}

/// IPs des réservations `dhcp-host=<mac>,<nom>, <ip>` (troisième champ)
fn reserved_ips(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.starts_with("dhcp-host"))
        .filter_map(|line| line.split(',').nth(2))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .collect()
}

fn ping(ip: &str) -> bool {
    Command::new("ping")
        .args(["-c", "1", "-W", "1", ip])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
