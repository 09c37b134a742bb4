//! `schoolerp` command line entry point.
//!
//! # Responsibility
//! - Open one tenant database and drive every UDISE+ coordinator operation.
//! - Print results as JSON on stdout; errors go to stderr with exit code 1.
//! - Logging is off unless a log directory is configured.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use schoolerp_core::db::open_db;
use schoolerp_core::{
    flush_logging, init_logging, CoreConfig, Gender, LegacyUdiseService, NewSchool, NewStudent,
    SchoolRepository, SocialCategory, SqliteSchoolRepository, SqliteStudentRepository,
    StudentUpdate, UdiseRegistrationService, UdiseStudentService,
};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "schoolerp", version, about = "SchoolERP UDISE+ student registry")]
struct Cli {
    #[arg(long, global = true, help = "JSON config file (db_path, log_level, log_dir)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Tenant database file; overrides config")]
    db: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level; overrides config")]
    log_level: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Absolute log directory; overrides config. Without one, nothing is logged"
    )]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Health check; does not open the database.
    Ping,
    /// Show which collaborator serves each operation.
    Bindings,
    School {
        #[command(subcommand)]
        command: SchoolCommands,
    },
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },
    Census {
        #[command(subcommand)]
        command: CensusCommands,
    },
}

#[derive(Subcommand, Debug)]
enum SchoolCommands {
    Add {
        #[arg(long)]
        udise_code: String,
        #[arg(long)]
        name: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum StudentCommands {
    Register {
        #[arg(long)]
        school_id: i64,
        #[arg(long)]
        name: String,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Register every student in a JSON array file.
    BulkRegister { file: PathBuf },
    Show { id: i64 },
    List {
        #[arg(long)]
        school_id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: StudentFields,
    },
    Validate { id: i64 },
}

#[derive(Subcommand, Debug)]
enum CensusCommands {
    Export {
        #[arg(long)]
        school_id: i64,
        #[arg(long, help = "Write the CSV here; the JSON output then carries `csv_path`")]
        out: Option<PathBuf>,
    },
}

/// Optional census fields shared by `register` and `update`.
#[derive(Args, Debug)]
struct StudentFields {
    #[arg(long, value_parser = parse_gender)]
    gender: Option<Gender>,
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    grade: Option<u8>,
    #[arg(long)]
    section: Option<String>,
    #[arg(long)]
    mother_name: Option<String>,
    #[arg(long)]
    father_name: Option<String>,
    #[arg(long)]
    aadhaar: Option<String>,
    #[arg(long, value_parser = parse_social_category)]
    category: Option<SocialCategory>,
}

impl StudentFields {
    fn into_new_student(self, school_id: i64, name: String) -> NewStudent {
        let mut student = NewStudent::new(school_id, name);
        student.gender = self.gender;
        student.date_of_birth = self.dob;
        student.grade = self.grade;
        student.section = self.section;
        student.mother_name = self.mother_name;
        student.father_name = self.father_name;
        student.aadhaar_number = self.aadhaar;
        student.social_category = self.category;
        student
    }

    fn into_update(self, name: Option<String>) -> StudentUpdate {
        StudentUpdate {
            name,
            gender: self.gender,
            date_of_birth: self.dob,
            grade: self.grade,
            section: self.section,
            mother_name: self.mother_name,
            father_name: self.father_name,
            aadhaar_number: self.aadhaar,
            social_category: self.category,
        }
    }
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

fn main() -> ExitCode {
    let result = run(Cli::parse());
    flush_logging();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Ping) {
        println!("schoolerp_core ping={}", schoolerp_core::ping());
        println!("schoolerp_core version={}", schoolerp_core::core_version());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open tenant db `{}`", config.db_path.display()))?;
    let schools = SqliteSchoolRepository::new(&conn);
    let legacy = LegacyUdiseService::new(
        SqliteStudentRepository::new(&conn),
        SqliteSchoolRepository::new(&conn),
    );
    let registration = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));
    let service = UdiseStudentService::new(&registration, &legacy);

    match cli.command {
        Commands::Ping => {}
        Commands::Bindings => print_json(&service.binding_table())?,
        Commands::School { command } => match command {
            SchoolCommands::Add { udise_code, name } => {
                let id = schools.create_school(&NewSchool::new(udise_code, name))?;
                let school = schools
                    .get_school(id)?
                    .context("created school missing on read-back")?;
                info!("event=cli_school_add module=cli status=ok school_id={id}");
                print_json(&school)?;
            }
            SchoolCommands::List => print_json(&schools.list_schools()?)?,
        },
        Commands::Student { command } => match command {
            StudentCommands::Register {
                school_id,
                name,
                fields,
            } => {
                let student = fields.into_new_student(school_id, name);
                print_json(&service.register_student_with_udise(&student)?)?;
            }
            StudentCommands::BulkRegister { file } => {
                let raw = std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read `{}`", file.display()))?;
                let students: Vec<NewStudent> = serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse `{}`", file.display()))?;
                print_json(&service.bulk_register_students_with_udise(&students)?)?;
            }
            StudentCommands::Show { id } => print_json(&service.get_udise_student_by_id(id)?)?,
            StudentCommands::List { school_id } => {
                print_json(&service.get_udise_students_by_school(school_id)?)?
            }
            StudentCommands::Update { id, name, fields } => {
                let update = fields.into_update(name);
                print_json(&service.update_udise_student(id, &update)?)?;
            }
            StudentCommands::Validate { id } => {
                print_json(&service.validate_udise_student_for_submission(id)?)?
            }
        },
        Commands::Census { command } => match command {
            CensusCommands::Export { school_id, out } => match out {
                Some(path) => export_census_to_file(&service, school_id, &path)?,
                None => print_json(&service.generate_udise_census_export(school_id)?)?,
            },
        },
    }
    Ok(())
}

fn export_census_to_file(
    service: &UdiseStudentService<'_>,
    school_id: i64,
    path: &Path,
) -> anyhow::Result<()> {
    // Opened first: a committed export has already moved its students to `exported`.
    let mut file =
        File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    let export = service.generate_udise_census_export(school_id)?;

    if let Err(err) = file.write_all(export.csv.as_bytes()) {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: false,
                data: &export,
            })?
        );
        return Err(err).with_context(|| {
            format!(
                "census export {} is committed but writing `{}` failed; the CSV was printed on stdout",
                export.export_id,
                path.display()
            )
        });
    }

    let mut data = serde_json::to_value(&export)?;
    if let Value::Object(fields) = &mut data {
        fields.remove("csv");
        fields.insert(
            "csv_path".to_string(),
            Value::String(path.display().to_string()),
        );
    }
    info!(
        "event=cli_census_export module=cli status=ok school_id={} export_id={}",
        school_id, export.export_id
    );
    print_json(&data)
}

fn resolve_config(cli: &Cli) -> anyhow::Result<CoreConfig> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    Ok(config)
}

fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    );
    Ok(())
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    Gender::parse(value).ok_or_else(|| format!("expected male|female|transgender, got `{value}`"))
}

fn parse_social_category(value: &str) -> Result<SocialCategory, String> {
    SocialCategory::parse(value).ok_or_else(|| format!("expected general|sc|st|obc, got `{value}`"))
}
