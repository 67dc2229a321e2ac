//! Command handlers

use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use market_client::list::SortSpec;
use market_client::{
    to_csv, totals, write_export, ApiGroup, AuthScheme, ClientConfig, DetailView, Editable, EndpointGroup,
    FetchOutcome, FileTokenStore, ListController, ListQuery, ListState, LoginRequest,
    MutationController, NetworkHttpClient, OrderComposer, OrderDraft, PageSize, Resource, SessionContext,
    SessionStore, SortDirection,
};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{Affiliate, InventoryItem, Member, Order, Redemption, Vendor, Voucher};

use crate::cli::{ClientArgs, Cli, Command, ListArgs, ResourceKind};

type Http = Arc<NetworkHttpClient>;

/// Run a generic handler with the model type of a resource kind
macro_rules! with_resource {
    ($kind:expr, $handler:ident ( $($arg:expr),* )) => {
        match $kind {
            ResourceKind::Affiliate => $handler::<Affiliate>($($arg),*).await,
            ResourceKind::Member => $handler::<Member>($($arg),*).await,
            ResourceKind::Vendor => $handler::<Vendor>($($arg),*).await,
            ResourceKind::Voucher => $handler::<Voucher>($($arg),*).await,
            ResourceKind::Inventory => $handler::<InventoryItem>($($arg),*).await,
            ResourceKind::Order => $handler::<Order>($($arg),*).await,
            ResourceKind::Redeem => $handler::<Redemption>($($arg),*).await,
        }
    };
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = client_config(&cli.client)?;

    let store = FileTokenStore::new(&config.token_file);
    store
        .ensure_dir()
        .with_context(|| format!("Cannot create {}", config.token_file.display()))?;
    let session = SessionContext::new(Arc::new(store));
    let http: Http = Arc::new(NetworkHttpClient::new(config, session)?);
    let sessions = SessionStore::new(http.clone());

    match cli.command {
        Command::Login { email, password } => {
            let identity = sessions
                .login(&LoginRequest { email, password })
                .await
                .map_err(|e| anyhow::anyhow!(sessions.state().message.unwrap_or_else(|| e.to_string())))?;
            println!("Logged in as {} ({})", identity.display_name, identity.role);
        }
        Command::Logout => {
            sessions.logout();
            println!("Logged out");
        }
        Command::Whoami => match sessions.restore().await {
            Some(identity) => {
                let email = identity.email.as_deref().unwrap_or("-");
                println!("{} <{}> ({})", identity.display_name, email, identity.role);
            }
            None => println!("Not logged in"),
        },
        Command::List(args) => {
            require_session(&http)?;
            match args.resource {
                ResourceKind::Order => {
                    let state = fetch::<Order>(&http, &args).await?;
                    print_rows(&state)?;
                    eprintln!("omzet on this page: {}", totals::order_omzet(&state.rows));
                    for (status, count) in totals::orders_by_status(&state.rows) {
                        eprintln!("  {}: {}", status, count);
                    }
                }
                ResourceKind::Inventory => {
                    let state = fetch::<InventoryItem>(&http, &args).await?;
                    print_rows(&state)?;
                    eprintln!("stock value on this page: {}", totals::inventory_value(&state.rows));
                }
                kind => with_resource!(kind, list(&http, &args))?,
            }
        }
        Command::Show { list, id } => {
            require_session(&http)?;
            with_resource!(list.resource, show(&http, &list, id))?;
        }
        Command::Export { list, out } => {
            require_session(&http)?;
            with_resource!(list.resource, export(&http, &list, &out))?;
        }
        Command::Create {
            resource,
            fields,
            items,
        } => {
            require_session(&http)?;
            match resource {
                ResourceKind::Order => create_order(&http, &fields, &items).await?,
                ResourceKind::Redeem => bail!("redemptions cannot be created from the console"),
                ResourceKind::Affiliate => create::<Affiliate>(&http, &fields).await?,
                ResourceKind::Member => create::<Member>(&http, &fields).await?,
                ResourceKind::Vendor => create::<Vendor>(&http, &fields).await?,
                ResourceKind::Voucher => create::<Voucher>(&http, &fields).await?,
                ResourceKind::Inventory => create::<InventoryItem>(&http, &fields).await?,
            }
        }
    }
    Ok(())
}

fn client_config(args: &ClientArgs) -> anyhow::Result<ClientConfig> {
    let base_url = args
        .api_url
        .as_deref()
        .context("MARKET_API_URL is not set (or pass --api-url)")?;
    let mut config = ClientConfig::new(base_url)
        .with_timeout(args.timeout)
        .with_token_file(&args.token_file)
        .with_close_delay(Duration::ZERO);
    if let Some(legacy) = &args.legacy_api_url {
        config = config.with_group(ApiGroup::Legacy, EndpointGroup::new(legacy.clone(), AuthScheme::Raw));
    }
    Ok(config)
}

fn require_session(http: &Http) -> anyhow::Result<()> {
    use market_client::HttpClient;
    if http.session().token().is_none() {
        bail!("Not logged in, run `market-admin login` first");
    }
    Ok(())
}

fn build_query<R: Resource>(args: &ListArgs) -> anyhow::Result<ListQuery> {
    let mut query = ListQuery::for_schema(&R::list_schema());
    let page_size = PageSize::try_from(args.page_size)?;
    query.page_size = page_size;
    query.offset = args.page.saturating_sub(1).saturating_mul(page_size.get());
    query.filter_text = args.filter.clone().unwrap_or_default();
    query.status = args.status.clone();
    if let Some(field) = &args.sort {
        query.sort = Some(SortSpec {
            field: field.clone(),
            direction: if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        });
    }
    query.extra = args.extra.iter().cloned().collect();
    Ok(query)
}

async fn fetch<R: Resource>(http: &Http, args: &ListArgs) -> anyhow::Result<ListState<R>> {
    let list: ListController<R, _> = ListController::new(http.clone());
    let outcome = list.set_query(build_query::<R>(args)?).await?;
    if outcome == FetchOutcome::Unchanged {
        list.refresh().await?;
    }
    let state = list.state();
    list.close();
    tracing::debug!(resource = R::NAME, rows = state.rows.len(), total = state.total_count, "Fetched");
    Ok(state)
}

fn print_rows<R: Resource>(state: &ListState<R>) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    for row in &state.rows {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    eprintln!(
        "page {} of {}, {} rows total",
        state.page_number(),
        state.page_count(),
        state.total_count
    );
    Ok(())
}

async fn list<R: Resource>(http: &Http, args: &ListArgs) -> anyhow::Result<()> {
    let state = fetch::<R>(http, args).await?;
    print_rows(&state)
}

async fn show<R: Resource>(http: &Http, args: &ListArgs, id: i64) -> anyhow::Result<()> {
    let state = fetch::<R>(http, args).await?;
    let mut detail = DetailView::new();
    if let Some(row) = state.rows.into_iter().find(|r| r.id() == id) {
        detail.open(row);
    }
    let Some(row) = detail.selected() else {
        bail!("no {} with id {} on this page", R::NAME, id);
    };
    println!("{}", serde_json::to_string_pretty(row)?);
    Ok(())
}

async fn export<R: Resource>(http: &Http, args: &ListArgs, out: &Path) -> anyhow::Result<()> {
    let state = fetch::<R>(http, args).await?;
    let bytes = to_csv(&state.rows, &R::csv_columns())?;
    let path = write_export(out, R::NAME, &bytes)?;
    println!("{} rows written to {}", state.rows.len(), path.display());
    Ok(())
}

/// Numbers and booleans are sent as such, anything else as text
fn field_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

async fn create<R: Editable>(http: &Http, fields: &[(String, String)]) -> anyhow::Result<()> {
    let form: MutationController<R, _> =
        MutationController::new(http.clone()).with_close_delay(Duration::ZERO);
    form.open_create();
    for (key, value) in fields {
        form.set_field(key.clone(), field_value(value));
    }

    match form.submit().await {
        Ok(outcome) => {
            println!("{}", outcome.message);
            if let Some(notice) = outcome.notice {
                println!("{}", notice);
            }
            if let Some(data) = outcome.data {
                println!("{}", serde_json::to_string(&data)?);
            }
            Ok(())
        }
        Err(e) => {
            let message = form.state().error_message.unwrap_or_else(|| e.to_string());
            bail!(message)
        }
    }
}

fn parse_item(raw: &str) -> anyhow::Result<(i64, i64, Decimal)> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [voucher, qty, price] = parts.as_slice() else {
        bail!("expected VOUCHER:QTY:PRICE, got '{}'", raw);
    };
    Ok((
        voucher.trim().parse().with_context(|| format!("bad voucher id in '{}'", raw))?,
        qty.trim().parse().with_context(|| format!("bad quantity in '{}'", raw))?,
        Decimal::from_str(price.trim()).with_context(|| format!("bad price in '{}'", raw))?,
    ))
}

async fn create_order(http: &Http, fields: &[(String, String)], items: &[String]) -> anyhow::Result<()> {
    let lines = items.iter().map(|i| parse_item(i)).collect::<anyhow::Result<Vec<_>>>()?;
    let mut member_id = None;
    let mut payment = String::new();
    for (key, value) in fields {
        match key.as_str() {
            "member_id" => member_id = Some(value.trim().parse().context("member_id must be a number")?),
            "payment_methode" | "payment" => payment = value.clone(),
            other => bail!("unknown order field '{}'", other),
        }
    }

    let mut order = OrderDraft {
        member_id,
        payment_method: payment,
        items: Vec::new(),
    };
    for (voucher, qty, price) in lines {
        order.add_item(voucher, qty, price)?;
    }

    let composer = OrderComposer::new(http.clone()).with_close_delay(Duration::ZERO);
    composer.open();
    composer.edit(|draft| *draft = order);
    let total = composer.state().total();

    match composer.submit().await {
        Ok(receipt) => {
            println!("Order {} created, total {}", receipt.code_trx, total);
            Ok(())
        }
        Err(e) => {
            let message = composer.state().error_message.unwrap_or_else(|| e.to_string());
            bail!(message)
        }
    }
}
