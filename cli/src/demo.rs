//! # Scripted Lifecycle Demo
//!
//! Walks the vault through a full capital cycle against the in-memory
//! collaborators: funding, deposits, partial deployment to the yield
//! facility, externally credited profit, reconciliation, recall, and
//! every depositor's exit. The full balance picture is printed at each
//! stage so the share-price mechanics are visible in the numbers.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use tracing::info;

use harbor_vault::config::BPS_DENOMINATOR;
use harbor_vault::sim::{InMemoryAssetLedger, SimYieldFacility};
use harbor_vault::{AssetLedger, Identity, Vault, YieldFacility};

use crate::cli::DemoArgs;

type SimVault = Vault<InMemoryAssetLedger, SimYieldFacility<InMemoryAssetLedger>>;

/// One depositor's view for the stage tables.
struct Depositor {
    name: String,
    identity: Identity,
}

/// Runs the scripted lifecycle and returns an error on the first
/// operation the vault rejects.
pub fn run(args: &DemoArgs) -> Result<()> {
    ensure!(args.depositors > 0, "demo needs at least one depositor");
    ensure!(args.deposit > 0, "demo deposits must be positive");
    ensure!(
        args.deploy_bps <= BPS_DENOMINATOR,
        "cannot deploy more than 10000 bps of idle capital"
    );

    let asset = Arc::new(InMemoryAssetLedger::new());
    let facility = Arc::new(SimYieldFacility::new(
        Identity::derive("demo-facility"),
        Arc::clone(&asset),
    ));
    let operator = Identity::derive("demo-operator");
    let mut vault: SimVault = Vault::new(Identity::derive("demo-vault"));
    vault
        .initialize(Arc::clone(&facility), Arc::clone(&asset), operator)
        .context("vault initialization")?;

    let depositors: Vec<Depositor> = (0..args.depositors)
        .map(|i| {
            let name = format!("depositor-{i}");
            let identity = Identity::derive(&name);
            Depositor { name, identity }
        })
        .collect();

    // Stage 1: fund and deposit.
    for d in &depositors {
        asset.mint(&d.identity, args.deposit);
        asset.approve(&d.identity, vault.identity(), args.deposit);
        let receipt = vault
            .deposit(&d.identity, args.deposit)
            .with_context(|| format!("deposit by {}", d.name))?;
        info!(
            depositor = %d.name,
            shares = receipt.shares_minted,
            "deposit settled"
        );
    }
    print_stage("after deposits", &vault, &asset, &facility, &depositors);

    // Stage 2: deploy a slice of idle capital.
    let to_deploy = vault.idle_assets() * args.deploy_bps / BPS_DENOMINATOR;
    vault
        .supply_to_facility(&operator, to_deploy)
        .context("supply to facility")?;
    print_stage("after deployment", &vault, &asset, &facility, &depositors);

    // Stage 3: the facility earns; profit is credited, never pushed.
    let profit = vault.deployed_assets() * args.profit_bps / BPS_DENOMINATOR;
    facility.credit_profit(vault.identity(), profit);
    // Back the credited profit with real tokens so recall can settle.
    asset.mint(facility.identity(), profit);
    let observed = vault
        .observe_facility_profit()
        .context("profit observation")?;
    info!(observed, "facility profit absorbed into the books");
    print_stage("after profit", &vault, &asset, &facility, &depositors);

    // Stage 4: recall everything and let every depositor exit.
    let position = facility.balance_of(vault.identity());
    vault
        .withdraw_from_facility(&operator, position)
        .context("recall from facility")?;
    for d in &depositors {
        let shares = vault.balance_of(&d.identity);
        let receipt = vault
            .withdraw(&d.identity, shares)
            .with_context(|| format!("withdrawal by {}", d.name))?;
        info!(
            depositor = %d.name,
            returned = receipt.assets_returned,
            "withdrawal settled"
        );
    }
    print_stage("after exits", &vault, &asset, &facility, &depositors);

    if args.json_snapshot {
        let json = serde_json::to_string_pretty(&vault.snapshot())
            .context("snapshot serialization")?;
        println!("{json}");
    }
    Ok(())
}

/// Prints the complete balance picture: every depositor's wallet and
/// stake, the vault's books, and the facility's belief.
fn print_stage(
    stage: &str,
    vault: &SimVault,
    asset: &InMemoryAssetLedger,
    facility: &SimYieldFacility<InMemoryAssetLedger>,
    depositors: &[Depositor],
) {
    println!("== {stage} ==");
    for d in depositors {
        println!(
            "  {:<14} wallet {:>8}  shares {:>8}",
            d.name,
            asset.balance_of(&d.identity),
            vault.balance_of(&d.identity),
        );
    }
    println!(
        "  vault          idle {:>10}  deployed {:>8}  total {:>8}  shares {:>8}",
        vault.idle_assets(),
        vault.deployed_assets(),
        vault.total_assets(),
        vault.total_shares(),
    );
    match vault.price_per_share() {
        Some(price) => println!("  price/share    {price} (fixed-point)"),
        None => println!("  price/share    undefined (no shares issued)"),
    }
    println!(
        "  facility       position {:>6}  tokens {:>8}",
        facility.balance_of(vault.identity()),
        asset.balance_of(facility.identity()),
    );
    println!();
}
