//! Jaz Checkout CLI

use std::{process::ExitCode, sync::Arc};

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use rusty_money::{Money, iso::Currency};
use tracing::{error, info};

use jaz_checkout::{
    api::{ApiError, HttpMarketplaceClient},
    checkout::{CheckoutContext, CheckoutSession, PaymentStatus},
    config::{ApiConfig, CheckoutConfig, LoggingConfig},
    coupons::{CouponResult, CouponTotals, PricingService},
    draft::OrderDraft,
    location::{Coordinate, LiveLocation, LocationChoice},
    money::{marketplace_currency, money_from_major, to_major},
    observability,
    orders::OrdersService,
    payments::{PaymentGateway, PaymentMethod, PaymentRequest, ProviderResult, ProviderStatus},
    schedule::Schedule,
    services::{NewServiceSelection, ServiceSelection},
    totals::{Totals, compute_totals},
};

#[derive(Debug, Parser)]
#[command(name = "jaz-checkout", about = "Jaz marketplace checkout tools", long_about = None)]
struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    checkout: CheckoutConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the totals breakdown of a service line
    Quote(QuoteArgs),

    /// Place a cash order against the marketplace API
    Order(Box<OrderArgs>),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Unit price in SAR
    #[arg(long)]
    price: f64,

    /// Quantity
    #[arg(long, default_value_t = 1)]
    qty: u32,

    /// Server-confirmed amount before tax
    #[arg(long, requires_all = ["coupon_discount", "coupon_tax", "coupon_total"])]
    coupon_before_tax: Option<f64>,

    /// Server-confirmed discount
    #[arg(long, requires = "coupon_before_tax")]
    coupon_discount: Option<f64>,

    /// Server-confirmed tax
    #[arg(long, requires = "coupon_before_tax")]
    coupon_tax: Option<f64>,

    /// Server-confirmed final total
    #[arg(long, requires = "coupon_before_tax")]
    coupon_total: Option<f64>,
}

#[derive(Debug, Args)]
struct OrderArgs {
    #[command(flatten)]
    api: ApiConfig,

    /// Category identifier
    #[arg(long)]
    category_id: String,

    /// Sub-category identifier
    #[arg(long)]
    sub_category_id: String,

    /// Service identifier
    #[arg(long)]
    service_id: String,

    /// Category title
    #[arg(long, default_value = "")]
    category_title: String,

    /// Sub-category title
    #[arg(long, default_value = "")]
    sub_category_title: String,

    /// Unit price in SAR
    #[arg(long)]
    price: f64,

    /// Quantity
    #[arg(long, default_value_t = 1)]
    qty: u32,

    /// Latitude of the service location; the default location is used when omitted
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of the service location
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Label of the service location
    #[arg(long)]
    label: Option<String>,

    /// Notes for the provider
    #[arg(long, default_value = "")]
    notes: String,

    /// Requested date (yyyy-MM-dd)
    #[arg(long, default_value = "")]
    date: String,

    /// Requested time (HH:mm)
    #[arg(long, default_value = "")]
    time: String,

    /// Coupon code to apply before ordering
    #[arg(long)]
    coupon: Option<String>,
}

/// Card and wallet payments need the provider's on-device collection step.
#[derive(Debug)]
struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn authorize(&self, _request: &PaymentRequest, method: PaymentMethod) -> ProviderResult {
        ProviderResult {
            status: ProviderStatus::Failed,
            id: None,
            message: Some(format!("{method} is not available from the command line")),
        }
    }

    async fn dismiss(&self) {}
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match load() {
        Ok(cli) => cli,
        Err(error) => {
            _ = error.print();

            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");

            ExitCode::FAILURE
        }
    }
}

fn load() -> Result<Cli, clap::Error> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    Cli::try_parse()
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Quote(args) => quote(&args, &cli.checkout),
        Commands::Order(args) => order(*args, &cli.checkout).await,
    }
}

fn quote(args: &QuoteArgs, checkout: &CheckoutConfig) -> Result<(), String> {
    let settings = checkout.settings().map_err(|error| error.to_string())?;
    let price = sar(args.price)?;

    let coupon = match (
        args.coupon_before_tax,
        args.coupon_discount,
        args.coupon_tax,
        args.coupon_total,
    ) {
        (Some(total_before_tax), Some(discount), Some(total_tax), Some(final_total)) => Some(
            CouponResult::try_from(&CouponTotals {
                total_before_tax,
                discount,
                total_tax,
                final_total,
            })
            .map_err(|error| error.to_string())?,
        ),
        _ => None,
    };

    let totals = compute_totals(&price, args.qty, coupon.as_ref(), &settings.tax_rate)
        .map_err(|error| error.to_string())?;

    print_totals(&totals);

    Ok(())
}

async fn order(args: OrderArgs, checkout: &CheckoutConfig) -> Result<(), String> {
    let settings = checkout.settings().map_err(|error| error.to_string())?;

    let service = ServiceSelection::try_from(NewServiceSelection {
        category_id: args.category_id,
        sub_category_id: args.sub_category_id,
        service_id: args.service_id,
        category_title: args.category_title,
        sub_category_title: args.sub_category_title,
        unit_price: sar(args.price)?,
        quantity: args.qty,
    })
    .map_err(|error| error.to_string())?;

    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => LocationChoice::LiveLocation(LiveLocation {
            coordinate: Coordinate::new(lat, lng).map_err(|error| error.to_string())?,
            label: args.label,
        }),
        _ => {
            let fallback = checkout
                .default_location()
                .map_err(|error| error.to_string())?
                .ok_or("no location given and no default location configured")?;

            LocationChoice::DefaultFallback(fallback)
        }
    };

    let schedule = Schedule::parse(&args.date, &args.time).map_err(|error| error.to_string())?;

    let mut draft = OrderDraft::new();

    draft.set_service(service);
    draft.set_location(location);
    draft.set_notes(args.notes);
    draft.set_schedule(schedule);

    let client = Arc::new(
        HttpMarketplaceClient::new(args.api.into()).map_err(|error: ApiError| error.to_string())?,
    );
    let pricing: Arc<dyn PricingService> = client.clone();
    let orders: Arc<dyn OrdersService> = client;

    let session = CheckoutSession::with_draft(
        CheckoutContext::new(pricing, orders, Arc::new(OfflineGateway), settings),
        draft,
    );

    info!(session = %session.id(), "placing order");

    if let Some(code) = args.coupon {
        session
            .apply_coupon(&code)
            .await
            .map_err(|error| error.user_message())?;
    }

    print_totals(&session.totals().await.map_err(|error| error.user_message())?);

    session
        .select_method(PaymentMethod::Cash)
        .await
        .map_err(|error| error.user_message())?;

    match session
        .pay_now()
        .await
        .map_err(|error| error.user_message())?
    {
        PaymentStatus::Placed(confirmation) => {
            #[expect(clippy::print_stdout, reason = "command output")]
            {
                println!("order {}", confirmation.order_id);

                if let Some(message) = confirmation.message {
                    println!("{message}");
                }
            }

            Ok(())
        }
        PaymentStatus::Canceled => Err("payment canceled".to_string()),
    }
}

fn sar(amount: f64) -> Result<Money<'static, Currency>, String> {
    money_from_major(amount, marketplace_currency()).map_err(|error| error.to_string())
}

fn print_totals(totals: &Totals) {
    let code = totals.grand_total.currency().iso_alpha_code;

    #[expect(clippy::print_stdout, reason = "command output")]
    {
        println!("before tax   {} {code}", to_major(&totals.before_tax));
        println!("discount     {} {code}", to_major(&totals.discount));
        println!("tax          {} {code}", to_major(&totals.tax));
        println!("grand total  {} {code}", to_major(&totals.grand_total));
    }
}
