use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use poultrydesk::api::Gateway;
use poultrydesk::config::{
    clear_session, config_dir, load_config, load_session, resolve_output_dir, save_session,
    Config, Session, CONFIG_TEMPLATE,
};
use poultrydesk::entry::{DcLine, PurchaseEntryForm, SalesEntryForm, SalesLine};
use poultrydesk::error::{DeskError, Result};
use poultrydesk::master::{build_loose_record, build_record, normalize_rows, EntityKind};
use poultrydesk::report::{self, ReportQuery, ReportType};
use poultrydesk::tabular::{
    cell_text, compute_totals, derive_headers, filter_rows, identifier_columns, sort_rows, Row,
};
use poultrydesk::{dashboard, fmt, pdf, sheet};

#[derive(Parser)]
#[command(name = "poultrydesk")]
#[command(version, about = "CLI trade desk for a poultry distribution business", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.poultrydesk or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config file
    Init,

    /// Manage the stored session token
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Show today's aggregate metrics
    Dashboard,

    /// Master data management (customers, routes, drivers, cities, vehicles, suppliers)
    Master {
        #[command(subcommand)]
        command: MasterCommands,
    },

    /// Run a sale or purchase report
    Report {
        /// Report type
        #[arg(short = 't', long = "type", value_enum)]
        report_type: ReportType,

        /// Report dimension (sale: route|customer|vehicle|driver|city, purchase: supplier|all)
        #[arg(short, long)]
        sub_type: String,

        /// Identifier of one entity of the sub-type's kind to filter by
        #[arg(long)]
        sub_id: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Sort by this column
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Export a printable PDF alongside the table
        #[arg(long)]
        pdf: bool,

        /// Export a spreadsheet alongside the table
        #[arg(long)]
        sheet: bool,

        /// List the available sub-filter values and exit
        #[arg(long)]
        list_subjects: bool,
    },

    /// Sales entry and sale-detail lookups
    Sales {
        #[command(subcommand)]
        command: SalesCommands,
    },

    /// Purchase entry, payments and lookups
    Purchase {
        #[command(subcommand)]
        command: PurchaseCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Store a bearer token obtained from the backend
    Set {
        /// The token value
        #[arg(long)]
        token: String,

        /// Mark the session as holding administrative privilege
        #[arg(long)]
        admin: bool,

        /// Token expiry (RFC 3339, e.g. 2026-09-30T12:00:00Z)
        #[arg(long)]
        expires: Option<String>,
    },

    /// Show the stored session
    Show,

    /// Forget the stored session
    Clear,
}

#[derive(Subcommand)]
enum MasterCommands {
    /// List records of one entity type
    List {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Keep only rows where any field contains this term (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Sort by this column
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Create a record from --set key=value fields
    Create {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Field assignment, can be repeated (e.g. --set name=Ravi)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Update a record by identifier
    Update {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Server-assigned identifier
        id: String,

        /// Field assignment, can be repeated
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Delete a record by identifier
    Delete {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Server-assigned identifier
        id: String,
    },
}

#[derive(Subcommand)]
enum SalesCommands {
    /// Submit a day's sales for one route in a single bulk request
    Entry {
        /// Sale date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Route identifier
        #[arg(long)]
        route: Option<String>,

        /// Vehicle identifier
        #[arg(long)]
        vehicle: Option<String>,

        /// Driver identifier
        #[arg(long)]
        driver: Option<String>,

        /// Line item "customer:kilograms:rate[:payment[:mode]]" (can be repeated)
        #[arg(short, long, value_name = "LINE")]
        line: Vec<String>,
    },

    /// List the customers served by a route
    Customers {
        /// Route identifier
        #[arg(long)]
        route: String,
    },

    /// Look up sale details for a trip
    Details {
        /// Sale date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Route identifier
        #[arg(long)]
        route: String,

        /// Vehicle identifier
        #[arg(long)]
        vehicle: String,

        /// Driver identifier
        #[arg(long)]
        driver: String,
    },

    /// Upsert a sale-detail record from --set key=value fields
    SaveDetails {
        /// Field assignment, can be repeated
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PurchaseCommands {
    /// Submit a purchase entry with its DC lines and attachments
    Entry {
        /// Entry date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Vehicle identifier
        #[arg(long)]
        vehicle: Option<String>,

        /// Driver identifier
        #[arg(long)]
        driver: Option<String>,

        /// Supplier identifier
        #[arg(long)]
        supplier: Option<String>,

        /// Supplier branch
        #[arg(long, default_value = "")]
        branch: String,

        /// Farm name
        #[arg(long, default_value = "")]
        farm: String,

        /// Supervisor name
        #[arg(long, default_value = "")]
        supervisor_name: String,

        /// Supervisor phone number
        #[arg(long, default_value = "")]
        supervisor_phone: String,

        /// Expense paid to driver
        #[arg(long, default_value_t = 0.0)]
        driver_expense: f64,

        /// Diesel amount
        #[arg(long, default_value_t = 0.0)]
        diesel: f64,

        /// Hamali amount
        #[arg(long, default_value_t = 0.0)]
        hamali: f64,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,

        /// DC line "dcNo:nos:kilograms[:rate]" (can be repeated)
        #[arg(long, value_name = "LINE")]
        dc: Vec<String>,

        /// Scanned DC to attach, pdf/jpg/png up to 5 MB (can be repeated)
        #[arg(long, value_name = "FILE")]
        attach: Vec<PathBuf>,
    },

    /// Record a payment to a supplier
    Payment {
        /// Supplier identifier
        #[arg(long)]
        supplier: String,

        /// Payment amount
        #[arg(long)]
        amount: f64,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Payment mode (cash or online)
        #[arg(long, default_value = "cash")]
        mode: String,
    },

    /// Look up a purchase entry by supplier and entry date
    Details {
        /// Supplier identifier
        #[arg(long)]
        supplier: String,

        /// Entry date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Session { command } => match command {
            SessionCommands::Set {
                token,
                admin,
                expires,
            } => cmd_session_set(&cfg_dir, token, admin, expires),
            SessionCommands::Show => cmd_session_show(&cfg_dir),
            SessionCommands::Clear => cmd_session_clear(&cfg_dir),
        },
        Commands::Dashboard => cmd_dashboard(&cfg_dir),
        Commands::Master { command } => match command {
            MasterCommands::List {
                entity,
                search,
                sort,
                desc,
            } => cmd_master_list(&cfg_dir, entity, search, sort, desc),
            MasterCommands::Create { entity, set } => cmd_master_create(&cfg_dir, entity, &set),
            MasterCommands::Update { entity, id, set } => {
                cmd_master_update(&cfg_dir, entity, &id, &set)
            }
            MasterCommands::Delete { entity, id } => cmd_master_delete(&cfg_dir, entity, &id),
        },
        Commands::Report {
            report_type,
            sub_type,
            sub_id,
            from,
            to,
            sort,
            desc,
            pdf,
            sheet,
            list_subjects,
        } => cmd_report(
            &cfg_dir,
            ReportArgs {
                report_type,
                sub_type,
                sub_id,
                from,
                to,
                sort,
                desc,
                pdf,
                sheet,
                list_subjects,
            },
        ),
        Commands::Sales { command } => match command {
            SalesCommands::Entry {
                date,
                route,
                vehicle,
                driver,
                line,
            } => cmd_sales_entry(&cfg_dir, date, route, vehicle, driver, &line),
            SalesCommands::Customers { route } => cmd_sales_customers(&cfg_dir, &route),
            SalesCommands::Details {
                date,
                route,
                vehicle,
                driver,
            } => cmd_sale_details(&cfg_dir, &date, &route, &vehicle, &driver),
            SalesCommands::SaveDetails { set } => cmd_save_sale_details(&cfg_dir, &set),
        },
        Commands::Purchase { command } => match command {
            PurchaseCommands::Entry {
                date,
                vehicle,
                driver,
                supplier,
                branch,
                farm,
                supervisor_name,
                supervisor_phone,
                driver_expense,
                diesel,
                hamali,
                notes,
                dc,
                attach,
            } => cmd_purchase_entry(
                &cfg_dir,
                PurchaseArgs {
                    date,
                    vehicle,
                    driver,
                    supplier,
                    branch,
                    farm,
                    supervisor_name,
                    supervisor_phone,
                    driver_expense,
                    diesel,
                    hamali,
                    notes,
                    dc,
                    attach,
                },
            ),
            PurchaseCommands::Payment {
                supplier,
                amount,
                date,
                mode,
            } => cmd_purchase_payment(&cfg_dir, &supplier, amount, date, &mode),
            PurchaseCommands::Details { supplier, date } => {
                cmd_purchase_details(&cfg_dir, &supplier, &date)
            }
        },
    }
}

/// Initialize config directory with a template config file
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(DeskError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized poultrydesk config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point api.base_url at your backend:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Store your bearer token:             poultrydesk session set --token <token>");
    println!();
    println!("Then check the connection:");
    println!("  poultrydesk dashboard");

    Ok(())
}

/// Load config and session, and build the gateway
fn connect(cfg_dir: &PathBuf) -> Result<(Config, Gateway)> {
    if !cfg_dir.exists() {
        return Err(DeskError::ConfigNotFound(cfg_dir.clone()));
    }
    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let gateway = Gateway::new(&config.api, session);
    Ok((config, gateway))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| DeskError::InvalidDate(input.to_string()))
}

fn parse_date_or_today(input: Option<String>) -> Result<NaiveDate> {
    match input {
        Some(s) => parse_date(&s),
        None => Ok(Local::now().date_naive()),
    }
}

/// Render dynamic rows under the given headers as a rounded table.
fn render_table(headers: &[String], rows: &[Row]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows {
        builder.push_record(headers.iter().map(|h| cell_text(row.get(h))));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Same, with a totals record appended.
fn render_table_with_totals(
    headers: &[String],
    rows: &[Row],
    totals: &serde_json::Map<String, serde_json::Value>,
) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows {
        builder.push_record(headers.iter().map(|h| cell_text(row.get(h))));
    }

    let mut totals_record: Vec<String> = headers
        .iter()
        .map(|h| {
            totals
                .get(h)
                .and_then(serde_json::Value::as_f64)
                .map(fmt::number)
                .unwrap_or_default()
        })
        .collect();
    if let Some(first) = totals_record.first_mut() {
        if first.is_empty() {
            *first = "TOTAL".to_string();
        }
    }
    builder.push_record(totals_record);

    builder.build().with(Style::rounded()).to_string()
}

// ----- session --------------------------------------------------------------

fn cmd_session_set(
    cfg_dir: &PathBuf,
    token: String,
    admin: bool,
    expires: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DeskError::ConfigNotFound(cfg_dir.clone()));
    }

    let expires_at = match expires {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| DeskError::InvalidDate(raw))?,
        ),
        None => None,
    };

    let session = Session {
        token,
        admin,
        expires_at,
    };
    save_session(cfg_dir, &session)?;

    println!("Stored session token ({})", mask(&session.token));
    if session.admin {
        println!("  Privilege: admin");
    }
    if let Some(expiry) = session.expires_at {
        println!("  Expires:   {}", expiry.to_rfc3339());
    }
    Ok(())
}

fn cmd_session_show(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DeskError::ConfigNotFound(cfg_dir.clone()));
    }

    let session = load_session(cfg_dir)?;
    if session.token.is_empty() {
        println!("No session stored.");
        return Ok(());
    }

    println!("Token:     {}", mask(&session.token));
    println!("Privilege: {}", if session.admin { "admin" } else { "user" });
    match session.expires_at {
        Some(expiry) if expiry <= Utc::now() => {
            println!("Expires:   {} (expired)", expiry.to_rfc3339())
        }
        Some(expiry) => println!("Expires:   {}", expiry.to_rfc3339()),
        None => println!("Expires:   unknown (assumed valid)"),
    }
    Ok(())
}

fn cmd_session_clear(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DeskError::ConfigNotFound(cfg_dir.clone()));
    }
    clear_session(cfg_dir)?;
    println!("Session cleared.");
    Ok(())
}

fn mask(token: &str) -> String {
    if token.chars().count() <= 8 {
        "********".to_string()
    } else {
        let prefix: String = token.chars().take(8).collect();
        format!("{prefix}…")
    }
}

// ----- dashboard ------------------------------------------------------------

fn cmd_dashboard(cfg_dir: &PathBuf) -> Result<()> {
    let (config, gateway) = connect(cfg_dir)?;

    let metrics = dashboard::fetch(&gateway)?;
    if metrics.is_empty() {
        println!("No dashboard metrics available.");
        return Ok(());
    }

    println!("{}", Local::now().format("%d %b %Y %H:%M:%S"));

    let mut builder = Builder::default();
    builder.push_record(["METRIC", "VALUE"]);
    for (label, value) in dashboard::tiles(&metrics, &config.report.currency_symbol) {
        builder.push_record([label, value]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    Ok(())
}

// ----- master data ----------------------------------------------------------

fn cmd_master_list(
    cfg_dir: &PathBuf,
    entity: EntityKind,
    search: Option<String>,
    sort: Option<String>,
    desc: bool,
) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;

    let schema = entity.schema();
    let mut rows = normalize_rows(gateway.list_entities(entity)?);
    schema.validate(&rows)?;

    if let Some(term) = search {
        rows = filter_rows(rows, &term);
    }
    if let Some(column) = sort {
        if schema.column(&column).is_none() {
            return Err(DeskError::UnknownColumn {
                column,
                context: entity.to_string(),
            });
        }
        sort_rows(&mut rows, &column, desc);
    }

    if rows.is_empty() {
        println!("No {entity} found.");
        return Ok(());
    }

    println!("{}", render_table(&schema.headers(), &rows));
    println!("{} {entity}", rows.len());
    Ok(())
}

fn cmd_master_create(cfg_dir: &PathBuf, entity: EntityKind, set: &[String]) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;
    let record = build_record(entity, set)?;
    gateway.create_entity(entity, &record)?;
    println!("Created {entity} record");
    Ok(())
}

fn cmd_master_update(
    cfg_dir: &PathBuf,
    entity: EntityKind,
    id: &str,
    set: &[String],
) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;
    let record = build_record(entity, set)?;
    gateway.update_entity(entity, id, &record)?;
    println!("Updated {entity} {id}");
    Ok(())
}

fn cmd_master_delete(cfg_dir: &PathBuf, entity: EntityKind, id: &str) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;
    gateway.delete_entity(entity, id)?;
    println!("Deleted {entity} {id}");
    Ok(())
}

// ----- reports --------------------------------------------------------------

struct ReportArgs {
    report_type: ReportType,
    sub_type: String,
    sub_id: Option<String>,
    from: String,
    to: String,
    sort: Option<String>,
    desc: bool,
    pdf: bool,
    sheet: bool,
    list_subjects: bool,
}

fn cmd_report(cfg_dir: &PathBuf, args: ReportArgs) -> Result<()> {
    let (config, gateway) = connect(cfg_dir)?;

    let query = ReportQuery::new(
        args.report_type,
        &args.sub_type,
        args.sub_id.clone(),
        parse_date(&args.from)?,
        parse_date(&args.to)?,
    )?;

    // Secondary selector: show what the sub-filter can be set to.
    if args.list_subjects {
        return match query.subject_entity() {
            Some(kind) => {
                let rows = normalize_rows(gateway.list_entities(kind)?);
                if rows.is_empty() {
                    println!("No {kind} found.");
                    return Ok(());
                }
                let headers = vec!["id".to_string(), kind.label_field().to_string()];
                println!("{}", render_table(&headers, &rows));
                Ok(())
            }
            None => {
                println!("'{}' takes no sub-filter.", args.sub_type);
                Ok(())
            }
        };
    }

    let mut rows = report::run(&gateway, &query)?;
    if rows.is_empty() {
        println!("No rows for the selected filters.");
        return Ok(());
    }

    let schema = query.schema();
    let headers = schema.headers();

    if let Some(column) = &args.sort {
        if schema.column(column).is_none() {
            return Err(DeskError::UnknownColumn {
                column: column.clone(),
                context: schema.context.to_string(),
            });
        }
        sort_rows(&mut rows, column, args.desc);
    }

    let totals = compute_totals(&rows, &headers, &schema.excluded());
    println!("{}", render_table_with_totals(&headers, &rows, &totals));
    println!("{} rows, {} to {}", rows.len(), args.from, args.to);

    if !args.pdf && !args.sheet {
        return Ok(());
    }

    let output_dir = resolve_output_dir(&config.report.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;
    let stem = format!(
        "REPORT-{}-{}-{}",
        query.report_type,
        query.sub_type,
        Local::now().format("%Y-%m-%d")
    );

    if args.pdf {
        let context = query
            .sub_type_id
            .as_ref()
            .map(|id| subject_label(&gateway, &query, id));
        let doc = pdf::print_doc(
            query.title(),
            args.from.clone(),
            args.to.clone(),
            Local::now().format("%B %d, %Y %H:%M").to_string(),
            context,
            config.organization.clone(),
            &headers,
            query.header_context_column(),
            &rows,
            &totals,
        );
        let pdf_path = output_dir.join(format!("{stem}.pdf"));
        pdf::generate_report_pdf(&doc, &pdf_path)?;
        println!("Saved {}", pdf_path.display());
    }

    if args.sheet {
        let sheet_path = output_dir.join(format!("{stem}.csv"));
        sheet::write_sheet(&headers, &rows, &sheet_path)?;
        println!("Saved {}", sheet_path.display());
    }

    Ok(())
}

/// Display label for the active sub-filter in the report header band. A
/// failed lookup falls back to the raw identifier rather than failing the
/// whole export.
fn subject_label(gateway: &Gateway, query: &ReportQuery, sub_id: &str) -> String {
    let name = query.subject_entity().and_then(|kind| {
        let rows = gateway.list_entities(kind).ok()?;
        rows.iter()
            .find(|row| cell_text(row.get("id")) == sub_id)
            .map(|row| cell_text(row.get(kind.label_field())))
    });
    match name {
        Some(name) if !name.is_empty() => format!("{}: {name}", fmt::title_from_camel(&query.sub_type)),
        _ => format!("{}: {sub_id}", fmt::title_from_camel(&query.sub_type)),
    }
}

// ----- sales ----------------------------------------------------------------

fn cmd_sales_entry(
    cfg_dir: &PathBuf,
    date: Option<String>,
    route: Option<String>,
    vehicle: Option<String>,
    driver: Option<String>,
    lines: &[String],
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DeskError::ConfigNotFound(cfg_dir.clone()));
    }

    let mut form = SalesEntryForm::new(parse_date_or_today(date)?);
    form.route = route;
    form.vehicle = vehicle;
    form.driver = driver;
    for input in lines {
        form.push_line(SalesLine::parse(input)?);
    }

    // Validation happens before the gateway is touched; a rejected form
    // costs no network traffic.
    let payload = form.payload()?;

    let (_, gateway) = connect(cfg_dir)?;
    gateway.create_sales(&payload)?;

    let submitted = form.lines.iter().filter(|l| l.is_complete()).count();
    let amount: f64 = form
        .lines
        .iter()
        .filter(|l| l.is_complete())
        .map(|l| l.amount)
        .sum();
    println!("Sales entry created");
    println!("  Date:   {}", form.date);
    println!("  Lines:  {submitted}");
    println!("  Amount: {}", fmt::number(amount));
    Ok(())
}

fn cmd_sales_customers(cfg_dir: &PathBuf, route: &str) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;

    let rows = normalize_rows(gateway.customers_by_route(route)?);
    if rows.is_empty() {
        println!("No customers on route {route}.");
        return Ok(());
    }

    let headers = derive_headers(&rows);
    println!("{}", render_table(&headers, &rows));
    println!("{} customers on route {route}", rows.len());
    Ok(())
}

fn cmd_sale_details(
    cfg_dir: &PathBuf,
    date: &str,
    route: &str,
    vehicle: &str,
    driver: &str,
) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;

    let rows = gateway.sale_details(parse_date(date)?, route, vehicle, driver)?;
    if rows.is_empty() {
        println!("No sale details for the given trip.");
        return Ok(());
    }

    let headers = derive_headers(&rows);
    let totals = compute_totals(&rows, &headers, &identifier_columns(&headers));
    println!("{}", render_table_with_totals(&headers, &rows, &totals));
    Ok(())
}

fn cmd_save_sale_details(cfg_dir: &PathBuf, set: &[String]) -> Result<()> {
    let record = build_loose_record(set)?;

    let (_, gateway) = connect(cfg_dir)?;
    gateway.save_sale_details(&record)?;
    println!("Sale details saved");
    Ok(())
}

// ----- purchases ------------------------------------------------------------

struct PurchaseArgs {
    date: Option<String>,
    vehicle: Option<String>,
    driver: Option<String>,
    supplier: Option<String>,
    branch: String,
    farm: String,
    supervisor_name: String,
    supervisor_phone: String,
    driver_expense: f64,
    diesel: f64,
    hamali: f64,
    notes: String,
    dc: Vec<String>,
    attach: Vec<PathBuf>,
}

fn cmd_purchase_entry(cfg_dir: &PathBuf, args: PurchaseArgs) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DeskError::ConfigNotFound(cfg_dir.clone()));
    }

    let mut form = PurchaseEntryForm {
        entry_date: Some(parse_date_or_today(args.date)?),
        vehicle: args.vehicle,
        driver: args.driver,
        supplier: args.supplier,
        branch: args.branch,
        farm: args.farm,
        supervisor_name: args.supervisor_name,
        supervisor_phone_no: args.supervisor_phone,
        driver_expense: args.driver_expense,
        diesel: args.diesel,
        hamali: args.hamali,
        notes: args.notes,
        dc_details: Vec::new(),
        attachments: args.attach,
    };
    for input in &args.dc {
        form.add_line(DcLine::parse(input)?);
    }

    // Local validation first, then the multipart submission.
    let payload = form.payload_json()?;

    let (_, gateway) = connect(cfg_dir)?;
    gateway.create_purchase(&payload, &form.attachments)?;

    let (nos, kilograms, amount) = form.line_totals();
    println!("Purchase entry created");
    println!("  DC lines:  {}", form.dc_details.len());
    println!("  Nos:       {}", fmt::number(nos));
    println!("  Kilograms: {}", fmt::number(kilograms));
    println!("  Amount:    {}", fmt::number(amount));
    if form.expense_total() > 0.0 {
        println!("  Expenses:  {}", fmt::number(form.expense_total()));
    }
    if !form.attachments.is_empty() {
        println!("  Attached:  {} file(s)", form.attachments.len());
    }
    Ok(())
}

fn cmd_purchase_payment(
    cfg_dir: &PathBuf,
    supplier: &str,
    amount: f64,
    date: Option<String>,
    mode: &str,
) -> Result<()> {
    if amount <= 0.0 {
        return Err(DeskError::InvalidNumber {
            field: "amount".to_string(),
            value: amount.to_string(),
        });
    }
    let date = parse_date_or_today(date)?;

    let (config, gateway) = connect(cfg_dir)?;
    let payment = serde_json::json!({
        "supplierId": supplier,
        "amount": amount,
        "date": date,
        "mode": mode,
    });
    gateway.record_purchase_payment(&payment)?;

    println!(
        "Recorded {} payment to supplier {supplier}",
        fmt::money(amount, &config.report.currency_symbol)
    );
    Ok(())
}

fn cmd_purchase_details(cfg_dir: &PathBuf, supplier: &str, date: &str) -> Result<()> {
    let (_, gateway) = connect(cfg_dir)?;

    let rows = gateway.purchase_details(supplier, parse_date(date)?)?;
    if rows.is_empty() {
        println!("No purchase entry for supplier {supplier} on {date}.");
        return Ok(());
    }

    let rows = normalize_rows(rows);
    let headers = derive_headers(&rows);
    println!("{}", render_table(&headers, &rows));
    Ok(())
}
