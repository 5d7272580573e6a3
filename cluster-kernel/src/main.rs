/**
 * CLUSTER KERNEL - Point d'entrée du service de bootstrap du cluster
 *
 * RÔLE : Orchestration des modules : config, pool d'IPs, ledger, health, HTTP.
 * Au démarrage le kernel recalcule le pool d'adresses disponibles depuis
 * dnsmasq.conf + l'état de l'interface, le persiste, puis sert l'API REST.
 *
 * ARCHITECTURE : cœur synchrone single-writer derrière un serveur Axum.
 * UTILITÉ : Un nœud fraîchement câblé POST sa MAC, reçoit IP + nom, et
 * dnsmasq est rechargé avec la réservation statique correspondante.
 */

mod config;
mod dnsmasq;
mod errors;
mod health;
mod http;
mod ledger;
mod network;
mod pool;
mod registration;
mod state;
mod store;

use crate::config::KernelConfig;
use crate::health::{CheckRegistry, DnsmasqActiveCheck, NodeConnectivityCheck, SufficientPowerCheck};
use crate::http::AppState;
use crate::ledger::ReservationLedger;
use crate::pool::AvailableIpPool;
use crate::registration::RegistrationService;
use crate::state::new_state;
use crate::store::FileStore;

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok(); // Ok si .env n'existe pas

    let cfg = config::load_config();
    println!("[kernel] dnsmasq config: {:?}", cfg.dnsmasq_config);
    println!("[kernel] reservations:   {:?}", cfg.static_dhcp_config);
    println!("[kernel] available IPs:  {:?}", cfg.available_ips_file);

    // seed du pool avant la première requête : le fichier devient la seule
    // source de vérité jusqu'au prochain redémarrage
    match seed_available_pool(&cfg) {
        Ok(count) => println!("[kernel] seeded pool with {} available addresses", count),
        Err(e) => {
            eprintln!("[kernel] failed to seed available IP pool: {}", e);
            std::process::exit(1);
        }
    }

    let pool = AvailableIpPool::new(Box::new(FileStore::new(cfg.available_ips_file.clone())));
    let ledger = ReservationLedger::new(Box::new(FileStore::new(cfg.static_dhcp_config.clone())));
    let registration = new_state(RegistrationService::new(pool, ledger));

    // health checks nommés
    let mut checks = CheckRegistry::new();
    checks.register(SufficientPowerCheck);
    checks.register(DnsmasqActiveCheck);
    checks.register(NodeConnectivityCheck::new(Box::new(FileStore::new(
        cfg.static_dhcp_config.clone(),
    ))));

    let app_state = AppState {
        registration,
        checks: Arc::new(checks),
    };

    // HTTP
    let app = http::build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    println!("[kernel] listening on http://{addr}");
    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Recalcule le pool d'adresses attribuables et le persiste (snapshot complet).
/// Ne tourne qu'au démarrage : une adresse libérée hors-bande ne revient dans
/// le pool qu'au prochain restart du kernel.
fn seed_available_pool(cfg: &KernelConfig) -> anyhow::Result<usize> {
    if let Some(parent) = cfg.available_ips_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating runtime directory {:?}", parent))?;
    }

    let iface = dnsmasq::parse_interface(&cfg.dnsmasq_config);
    let facts = network::interface_facts(&iface)?;
    let ranges = dnsmasq::parse_dhcp_ranges(&cfg.dnsmasq_config);

    let available = pool::compute_available(facts.network, facts.address, &ranges);
    let pool = AvailableIpPool::new(Box::new(FileStore::new(cfg.available_ips_file.clone())));
    pool.persist(&available)?;
    Ok(available.len())
}
