//! Main entry point for the Wellbeing-360 pharmacy client.
//!
//! A command-line front end over the pharmacy backend: list and inspect
//! orders, advance an order through its fulfilment status, look up and export
//! an employee's orders, and view payments and daily statistics.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wellbeing_config::Config;
use wellbeing_core::StatusTab;

mod commands;
mod render;

use commands::App;

/// Command-line arguments for the pharmacy client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "WELLBEING_CONFIG", default_value = "config/wellbeing.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// List orders, optionally filtered by employee number
	Orders {
		#[arg(short, long)]
		employee: Option<String>,
	},
	/// Show an order with its status stepper
	Show { order_id: String },
	/// Move an order to its next status
	Advance { order_id: String },
	/// Show an employee's details and orders
	Employee {
		employee_no: String,
		/// Write the orders to employee_orders_<no>.csv
		#[arg(long)]
		export: bool,
	},
	/// List payments
	Payments {
		#[arg(short, long)]
		employee: Option<String>,
		/// All, Paid, Pending or Failed
		#[arg(short, long, default_value = "All")]
		status: StatusTab,
	},
	/// Show dashboard statistics for a day
	Stats {
		/// Day as YYYY-MM-DD, today when omitted
		#[arg(short, long)]
		date: Option<NaiveDate>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		backend = %config.backend.primary,
		base_url = %config.backend.base_url(),
		"Loaded configuration"
	);

	let mut app = App::from_config(&config)?;
	let output = match args.command {
		Command::Orders { employee } => app.orders(employee.as_deref()).await?,
		Command::Show { order_id } => app.show(&order_id).await?,
		Command::Advance { order_id } => match app.advance(&order_id).await {
			Ok(output) => output,
			Err(failed) => {
				print!("{}", failed.output);
				return Err(failed.source.into());
			},
		},
		Command::Employee {
			employee_no,
			export,
		} => app.employee(&employee_no, export).await?,
		Command::Payments { employee, status } => {
			app.payments(employee.as_deref(), status).await?
		},
		Command::Stats { date } => {
			let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
			app.stats(date).await?
		},
	};

	print!("{}", output);
	Ok(())
}
