use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::future::join_all;

use hrpanel::api::FilePart;
use hrpanel::controller::FormController;
use hrpanel::forms::{
    CareerForm, CompanyForm, DepartmentForm, EmployeeForm, FormDraft, FormMode, FormSpec,
    SalarySlipForm,
};
use hrpanel::models::Record;
use hrpanel::resources::{
    ApplicantResource, CareerResource, CompanyResource, DepartmentResource, EmployeeResource,
    Resource, SalarySlipResource,
};
use hrpanel::services::{LoginOutcome, employee_of};
use hrpanel::{AppContext, ClientError, Config, ListController};

#[derive(Parser)]
#[command(name = "hrpanel", version, about = "HR and recruitment admin panel")]
struct Cli {
    /// Overrides API_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password.
    Login { email: String, password: String },
    /// Finish signing in with the emailed OTP.
    VerifyOtp {
        otp: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Request a fresh login OTP.
    ResendOtp { email: String, password: String },
    /// Admin access step.
    AdminOtp {
        #[command(subcommand)]
        action: AdminOtpAction,
    },
    Logout,
    /// Headline figures for the admin home screen.
    Dashboard,
    /// Import employee records from the shared sheet.
    UploadEmployees,
    /// Remove every bulk-imported employee.
    DeleteUploadedEmployees,
    Companies {
        #[command(subcommand)]
        action: Action,
    },
    Departments {
        #[arg(long)]
        company: String,
        #[command(subcommand)]
        action: Action,
    },
    Employees {
        #[arg(long)]
        company: String,
        #[arg(long)]
        dept: String,
        #[command(subcommand)]
        action: Action,
    },
    Slips {
        #[arg(long)]
        company: String,
        #[arg(long)]
        dept: String,
        #[arg(long)]
        employee: String,
        #[command(subcommand)]
        action: SlipAction,
    },
    Careers {
        #[command(subcommand)]
        action: Action,
    },
    Applicants {
        #[arg(long)]
        designation: String,
        #[command(subcommand)]
        action: ApplicantAction,
    },
}

#[derive(Subcommand)]
enum AdminOtpAction {
    Send,
    Verify { otp: String },
}

#[derive(Args, Clone)]
struct PageArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args, Clone)]
struct DraftArgs {
    /// Field value as key=value. Repeatable.
    #[arg(long = "set", value_parser = parse_pair)]
    set: Vec<(String, String)>,
    /// File upload as field=path. Repeatable.
    #[arg(long = "file", value_parser = parse_pair)]
    file: Vec<(String, String)>,
}

#[derive(Subcommand, Clone)]
enum Action {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    Create {
        #[command(flatten)]
        draft: DraftArgs,
        #[command(flatten)]
        paging: PageArgs,
    },
    Update {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
        #[command(flatten)]
        paging: PageArgs,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
        #[command(flatten)]
        paging: PageArgs,
    },
}

#[derive(Subcommand)]
enum SlipAction {
    #[command(flatten)]
    Crud(Action),
    /// Email a slip to the employee.
    Send {
        id: String,
    },
    /// Print the printable slip's link.
    Url {
        id: String,
    },
}

#[derive(Subcommand)]
enum ApplicantAction {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
        #[command(flatten)]
        paging: PageArgs,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url.trim_end_matches('/').to_string();
    }
    log::debug!(
        "Using {} (environment: {})",
        config.api_base_url,
        config.environment
    );

    let ctx = AppContext::from_config(config)?;

    match run(&ctx, cli.command).await {
        Err(e) => match e.downcast_ref::<ClientError>() {
            Some(ClientError::Unauthorized { redirect }) => {
                eprintln!("🔒 Not signed in for this action. Continue at {}", redirect);
                std::process::exit(2);
            }
            Some(client) => {
                eprintln!("❌ {}", client.user_message());
                if let ClientError::Validation(errors) = client {
                    for (field, message) in errors.iter() {
                        eprintln!("   {}: {}", field, message);
                    }
                }
                std::process::exit(1);
            }
            None => Err(e),
        },
        Ok(()) => Ok(()),
    }
}

async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            match ctx.auth.login(&email, &password).await? {
                LoginOutcome::OtpSent { email } => {
                    println!("📧 OTP sent to {}. Run `hrpanel verify-otp <otp>`.", email)
                }
                LoginOutcome::LoggedIn { target } => {
                    println!("✅ Signed in, continue at {}", target)
                }
            }
        }
        Command::VerifyOtp { otp, email } => {
            let target = ctx.auth.verify_login_otp(email.as_deref(), &otp).await?;
            println!("✅ Signed in, continue at {}", target);
        }
        Command::ResendOtp { email, password } => {
            // Each CLI invocation is a fresh process, so the credentials come in again
            if let LoginOutcome::OtpSent { email } = ctx.auth.login(&email, &password).await? {
                println!("📧 OTP re-sent to {}", email);
            }
        }
        Command::AdminOtp { action } => match action {
            AdminOtpAction::Send => {
                let message = ctx.auth.send_admin_otp().await?;
                println!("📧 {}", message.unwrap_or_else(|| "OTP sent".to_string()));
            }
            AdminOtpAction::Verify { otp } => {
                ctx.auth.verify_admin_otp(&otp).await?;
                println!("✅ Admin access granted");
            }
        },
        Command::Logout => {
            ctx.auth.logout()?;
            println!("👋 Signed out");
        }
        Command::Dashboard => {
            ctx.session.require_admin()?;
            let (employees, counts) =
                tokio::join!(ctx.admin.total_employees(), ctx.admin.career_counts());
            println!("Total employees: {}", employees?);
            let counts = counts?;
            if counts.is_empty() {
                println!("No applications submitted yet.");
            } else {
                println!("Applications by designation:");
                for (designation, count) in counts {
                    println!("  {:<30} {}", designation, count);
                }
            }
        }
        Command::UploadEmployees => {
            ctx.session.require_admin()?;
            println!("✅ {}", ctx.admin.upload_employee_records().await?);
        }
        Command::DeleteUploadedEmployees => {
            ctx.session.require_admin()?;
            let deleted = ctx.admin.delete_uploaded_employees().await?;
            println!("🗑️  Deleted {} uploaded employees", deleted);
        }
        Command::Companies { action } => {
            ctx.session.require_admin()?;
            run_form(ctx, CompanyForm, CompanyResource, action, None).await?;
        }
        Command::Departments { company, action } => {
            ctx.session.require_admin()?;
            run_form(ctx, DepartmentForm, DepartmentResource::new(company), action, None).await?;
        }
        Command::Employees {
            company,
            dept,
            action,
        } => {
            ctx.session.require_admin()?;
            run_form(ctx, EmployeeForm, EmployeeResource::new(company, dept), action, None).await?;
        }
        Command::Slips {
            company,
            dept,
            employee,
            action,
        } => {
            ctx.session.require_admin()?;
            let resource = SalarySlipResource::new(company, dept, employee);
            run_slips(ctx, resource, action).await?;
        }
        Command::Careers { action } => {
            ctx.session.require_user()?;
            run_form(ctx, CareerForm, CareerResource, action, None).await?;
        }
        Command::Applicants {
            designation,
            action,
        } => {
            ctx.session.require_user()?;
            let resource = ApplicantResource::new(designation);
            match action {
                ApplicantAction::List { paging } => {
                    let list = open_list(ctx, resource, &paging).await;
                    print!("{}", list.view("No applicants for this designation."));
                }
                ApplicantAction::Delete { ids, paging } => {
                    let list = open_list(ctx, resource, &paging).await;
                    delete_all(&list, &ids).await;
                }
            }
        }
    }
    Ok(())
}

async fn run_slips(
    ctx: &AppContext,
    resource: SalarySlipResource,
    action: SlipAction,
) -> Result<()> {
    let payroll = ctx.payroll(resource.clone());
    match action {
        SlipAction::Crud(action) => {
            let prefilled = match &action {
                Action::Create { .. } => Some(payroll.prefilled_draft().await),
                _ => None,
            };
            run_form(ctx, SalarySlipForm, resource, action, prefilled).await
        }
        SlipAction::Send { id } => {
            let list = open_list(ctx, resource, &PageArgs { page: None, limit: None }).await;
            let employee = employee_of(&list.snapshot());
            let message = payroll.send_slip(&id, employee.as_ref()).await?;
            println!("📧 {}", message.unwrap_or_else(|| "Salary slip sent by email".to_string()));
            Ok(())
        }
        SlipAction::Url { id } => {
            println!("{}", payroll.slip_url(&id));
            Ok(())
        }
    }
}

async fn open_list<R: Resource>(
    ctx: &AppContext,
    resource: R,
    paging: &PageArgs,
) -> ListController<R> {
    let list = ctx.list(resource, None);
    let query = list.query();
    let page = paging.page.unwrap_or(query.page);
    let limit = paging.limit.unwrap_or(query.limit);
    // A failed load is kept in the list state and shows up in the rendered view
    if let Err(e) = list.load(page, limit).await {
        log::debug!("Initial {} load failed: {}", R::NAME, e);
    }
    list
}

async fn run_form<F: FormSpec>(
    ctx: &AppContext,
    form_spec: F,
    resource: F::Resource,
    action: Action,
    prefilled: Option<FormDraft>,
) -> Result<()> {
    let empty_message = format!("No {} found.", <F::Resource as Resource>::LABEL.to_lowercase());
    match action {
        Action::List { paging } => {
            let list = open_list(ctx, resource, &paging).await;
            print!("{}", list.view(&empty_message));
        }
        Action::Create { draft, paging } => {
            let list = open_list(ctx, resource, &paging).await;
            let form = FormController::new(form_spec);
            form.open_with(FormMode::Create, prefilled.unwrap_or_default());
            submit(&form, &list, &draft).await?;
        }
        Action::Update { id, draft, paging } => {
            let list = open_list(ctx, resource, &paging).await;
            let existing = list
                .snapshot()
                .items
                .into_iter()
                .find(|item| item.id() == id);
            let form = FormController::new(form_spec);
            match &existing {
                Some(record) => form.open(Some(record)),
                None => {
                    log::info!(
                        "{} {} is not on this page, editing from the given fields only",
                        <F::Resource as Resource>::NAME,
                        id
                    );
                    form.open_with(FormMode::Edit(id), FormDraft::new());
                }
            }
            submit(&form, &list, &draft).await?;
        }
        Action::Delete { ids, paging } => {
            let list = open_list(ctx, resource, &paging).await;
            delete_all(&list, &ids).await;
        }
    }
    Ok(())
}

async fn submit<F: FormSpec>(
    form: &FormController<F>,
    list: &ListController<F::Resource>,
    draft: &DraftArgs,
) -> Result<()> {
    for (field, value) in &draft.set {
        form.set_field(field, value.clone());
    }
    for (field, path) in &draft.file {
        let part = FilePart::load(field, path)
            .await
            .with_context(|| format!("reading {}", path))?;
        form.set_file(part);
    }

    let outcome = form.submit(list).await?;
    println!(
        "✅ {}",
        outcome
            .message
            .unwrap_or_else(|| format!("{} saved", <F::Resource as Resource>::NAME))
    );
    print!("{}", list.view("Nothing to show."));
    Ok(())
}

/// Fires every delete at once; each row settles on its own.
async fn delete_all<R: Resource>(list: &ListController<R>, ids: &[String]) {
    let results = join_all(ids.iter().map(|id| list.delete(id))).await;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(outcome) => println!(
                "🗑️  {}",
                outcome
                    .message
                    .unwrap_or_else(|| format!("Deleted {} {}", R::NAME, id))
            ),
            Err(e) => eprintln!("❌ {}: {}", id, e.user_message()),
        }
    }
    print!("{}", list.view(&format!("No {} left.", R::LABEL.to_lowercase())));
}
