use std::error::Error;
use vpc_utilization_summary::output::snapshot_print;
use vpc_utilization_summary::processing::{grade_vpc, list_vpcs, service_info};
use vpc_utilization_summary::{
    refresh_topology, GeneratorConfig, LocalProvisioner, MemoryStore, TopologyStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs: {e}"))?;
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let config = GeneratorConfig::from_env()?;
    let provisioner = LocalProvisioner::new();
    let store = MemoryStore::new();
    let report = refresh_topology(&config, &mut config.rng(), &provisioner, &store).await?;
    log::info!(
        "Refresh done: {} VPCs, {} subnets, {} addresses used",
        report.networks,
        report.subnets,
        report.addresses_used
    );

    let snapshot = store.snapshot().await?;
    snapshot_print(&snapshot);

    println!("{}", serde_json::to_string_pretty(&service_info())?);
    for vpc in list_vpcs(&snapshot).vpcs {
        if let Some(grade) = grade_vpc(&snapshot, &vpc.network_id) {
            println!("{}", serde_json::to_string_pretty(&grade)?);
        }
    }

    log::info!("# End main()");
    Ok(())
}
