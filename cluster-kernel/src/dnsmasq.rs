/**
 * DNSMASQ CONFIG PARSER - Lecture de la configuration du démon DHCP
 *
 * RÔLE : Extraire de dnsmasq.conf l'interface gérée et les plages de baux
 * dynamiques (dhcp-range). Ces deux informations déterminent quelles adresses
 * le kernel peut réserver statiquement sans entrer en collision avec le démon.
 *
 * Le parsing est volontairement permissif : lignes malformées ignorées,
 * fichier absent = configuration vide. Le caller décide quoi faire d'une
 * interface non configurée (chaîne vide).
 */

use std::net::Ipv4Addr;
use std::path::Path;

/// Plage inclusive d'adresses réservées aux baux dynamiques
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl DhcpRange {
    /// Normalise à la construction : start <= end toujours garanti.
    pub fn new(a: Ipv4Addr, b: Ipv4Addr) -> Self {
        if u32::from(b) < u32::from(a) {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let ip = u32::from(ip);
        u32::from(self.start) <= ip && ip <= u32::from(self.end)
    }
}

/// Supprime les commentaires inline (`#` ou `;`) et les espaces.
/// Partagé avec le ledger : même convention de commentaires que dnsmasq.
pub(crate) fn strip_comment(line: &str) -> &str {
    line.split(['#', ';']).next().unwrap_or(line).trim()
}

/// Interface configurée dans dnsmasq.conf, ou chaîne vide si absente.
/// Accepte `interface=eth0` et `interface = eth0`, première occurrence gagne.
pub fn parse_interface(conf_path: &Path) -> String {
    let Ok(content) = std::fs::read_to_string(conf_path) else {
        return String::new();
    };
    for raw_line in content.lines() {
        let line = strip_comment(raw_line);
        if line.is_empty() || !line.starts_with("interface") {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != "interface" {
            continue;
        }
        return value.trim().to_string();
    }
    String::new()
}

/// Toutes les plages `dhcp-range=start,end,...` du fichier.
/// Champs additionnels (netmask, durée de bail) ignorés ; bornes inversées
/// remises dans l'ordre ; lignes avec moins de deux IPs valides ignorées.
pub fn parse_dhcp_ranges(conf_path: &Path) -> Vec<DhcpRange> {
    let Ok(content) = std::fs::read_to_string(conf_path) else {
        return Vec::new();
    };
    let mut ranges = Vec::new();
    for raw_line in content.lines() {
        let line = strip_comment(raw_line);
        if !line.starts_with("dhcp-range") {
            continue;
        }
        let literals = ipv4_literals(line);
        if literals.len() < 2 {
            continue;
        }
        let (Ok(start), Ok(end)) = (
            literals[0].parse::<Ipv4Addr>(),
            literals[1].parse::<Ipv4Addr>(),
        ) else {
            continue;
        };
        ranges.push(DhcpRange::new(start, end));
    }
    ranges
}

/// Sous-chaînes en forme de dotted-quad (4 groupes de 1-3 chiffres).
/// La validité des octets est vérifiée au parse, pas ici.
fn ipv4_literals(line: &str) -> Vec<&str> {
    line.split(|c: char| !c.is_ascii_digit() && c != '.')
        .filter(|token| looks_like_ipv4(token))
        .collect()
}

fn looks_like_ipv4(token: &str) -> bool {
    let mut groups = 0;
    for part in token.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        groups += 1;
    }
    groups == 4
}
