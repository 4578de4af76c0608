//! storefront - drive the client against a running order backend
//!
//! Reads `PIZZA_*` settings (and `.env`), logs in with `PIZZA_USERNAME` /
//! `PIZZA_PASSWORD` unless a persisted session exists, then:
//! - customers: list their orders (`*` marks ones still open), list the
//!   catalog, and order the first item to `PIZZA_ADDRESS` when set
//! - employees: list pending orders and assign the first one

use std::sync::Arc;

use anyhow::Context;
use pizza_client::{
    AuthFlow, Backend, Checkout, ClientConfig, Gate, OrderHistory, ProcessQueue, Role, Route,
    format_money,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pizza_client=info,storefront=info".into()),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, prefix = %config.api_prefix, "Starting storefront");

    let session = config.open_session()?;
    let api = Arc::new(config.build_api(session.clone())?);
    let backend: Arc<dyn Backend> = api;
    let gate = Gate::new(session.clone());

    let route = if session.read().is_authenticated() {
        let role = session.read().role().context("restored session has no role")?;
        pizza_client::gate::landing_route(role)
    } else {
        let username = std::env::var("PIZZA_USERNAME").context("PIZZA_USERNAME is not set")?;
        let password = std::env::var("PIZZA_PASSWORD").context("PIZZA_PASSWORD is not set")?;
        match AuthFlow::new(backend.clone(), session.clone())
            .login_with_notice(&username, &password)
            .await
        {
            Ok(route) => route,
            Err(notice) => anyhow::bail!("{notice}"),
        }
    };

    let decision = gate.check(&route);
    if let Some(target) = decision.redirect_target() {
        anyhow::bail!("cannot enter {route}: redirected to {target}");
    }
    let menu: Vec<String> = gate.menu().iter().map(|r| r.path()).collect();
    tracing::info!(route = %route, menu = ?menu, "Landed");

    match session.read().role() {
        Some(Role::Customer) => run_customer(backend, &gate, session).await?,
        Some(Role::Employee) => run_employee(backend, session).await?,
        None => anyhow::bail!("not logged in"),
    }

    Ok(())
}

async fn run_customer(
    backend: Arc<dyn Backend>,
    gate: &Gate,
    session: pizza_client::SessionStore,
) -> anyhow::Result<()> {
    let mut history = OrderHistory::new(backend.clone(), session.clone());
    for order in history.load().await {
        let marker = if order.status.is_terminal() { " " } else { "*" };
        println!(
            "{marker}#{:<5} {:<11} {:>10}  {}",
            order.id,
            order.status.as_str(),
            format_money(order.total()),
            order.address
        );
    }
    if let Some(error) = history.error() {
        println!("{error}");
    }

    if !gate.check(&Route::CreateOrder).is_allowed() {
        return Ok(());
    }

    let mut checkout = Checkout::new(backend, session);
    let catalog = checkout.refresh_catalog().await.clone();
    for item in catalog.items() {
        println!(
            "{:>4}  {:<24} {:>8}",
            item.id,
            item.name,
            format_money(item.price)
        );
    }

    let (Some(first), Ok(address)) = (catalog.items().first(), std::env::var("PIZZA_ADDRESS"))
    else {
        return Ok(());
    };
    checkout.increment(first.id);
    checkout.set_address(address);
    println!("Cart total: {}", checkout.summary().formatted_total());
    println!("{}", checkout.place_order().await);
    Ok(())
}

async fn run_employee(
    backend: Arc<dyn Backend>,
    session: pizza_client::SessionStore,
) -> anyhow::Result<()> {
    let queue = ProcessQueue::new(backend, session);
    queue.refresh().await?;

    let orders = queue.orders();
    println!("{} pending order(s)", orders.len());
    let Some(order) = orders.first() else {
        return Ok(());
    };

    let (notice, outcome) = queue.process_with_notice(order.id).await;
    println!("{notice}");
    if let Some(outcome) = outcome {
        println!("Distance: {}  Time: {}", outcome.distance, outcome.time);
    }
    Ok(())
}
