use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn, LevelFilter};
use dukevm::{Interpreter, VmConfig};
use raw_class_file::descriptor::MethodDescriptor;
use raw_class_file::{access, ClassFile};

mod dump;

const MAIN_NAME: &str = "main";
const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

fn main() -> Result<()> {
	let cli: Cli = Cli::parse();

	setup_logging(cli.verbose, cli.quiet)?;
	debug!("{cli:?}");

	match cli.command {
		Command::Dump { path } => {
			let class = load(&path)?;
			let mut stdout = std::io::stdout().lock();
			dump::dump(&class, &mut stdout)
				.with_context(|| anyhow!("failed to dump class file {path:?}"))?;
			stdout.flush()?;
		},
		Command::Run { path, method, descriptor, max_depth, trace_disassembly, arguments } => {
			let class = load(&path)?;
			let config = VmConfig {
				max_call_depth: max_depth,
				disassemble_before_run: trace_disassembly,
				..VmConfig::default()
			};
			run(class, config, method, descriptor, &arguments)?;
		},
	}
	Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
	let level = match (quiet, verbose) {
		(true, _) => LevelFilter::Off,
		(false, 0) => LevelFilter::Warn,
		(false, 1) => LevelFilter::Debug,
		(false, _) => LevelFilter::Trace,
	};
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {message}", record.level(), record.target()))
		})
		.level(level)
		// program output goes to stdout
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up logging")
}

fn load(path: &Path) -> Result<ClassFile> {
	let bytes = std::fs::read(path)
		.with_context(|| anyhow!("failed to read class file {path:?}"))?;
	let class = ClassFile::load(&bytes)
		.with_context(|| anyhow!("failed to load class file {path:?}"))?;
	info!("loaded {} from {path:?}", class.name()?);
	Ok(class)
}

fn run(class: ClassFile, config: VmConfig, method: Option<String>, descriptor: Option<String>, arguments: &[String]) -> Result<()> {
	if log::log_enabled!(log::Level::Debug) {
		let pool = &class.constant_pool;
		for info in &class.methods {
			debug!("method {} {}{}", access::method_flags(info.access_flags).join(" "), info.name(pool)?, info.descriptor(pool)?);
		}
	}

	let (name, descriptor) = match (method, descriptor) {
		(Some(name), Some(descriptor)) => (name, descriptor),
		(None, None) => {
			if class.find_method(MAIN_NAME, MAIN_DESCRIPTOR)?.is_none() {
				bail!("class {} has no method {MAIN_NAME}{MAIN_DESCRIPTOR}, select one with --method and --descriptor", class.name()?);
			}
			(MAIN_NAME.to_owned(), MAIN_DESCRIPTOR.to_owned())
		},
		_ => bail!("--method and --descriptor must be given together"),
	};
	let parsed = MethodDescriptor::parse(&descriptor)
		.with_context(|| anyhow!("invalid method descriptor {descriptor:?}"))?;

	let mut interpreter = Interpreter::new(class, config)?;

	let arguments = if name == MAIN_NAME && descriptor == MAIN_DESCRIPTOR {
		vec![interpreter.new_string_array(arguments)?]
	} else if parsed.parameters.is_empty() {
		Vec::new()
	} else {
		bail!("can only run methods without parameters or {MAIN_NAME}{MAIN_DESCRIPTOR}, {name}{descriptor} has parameters");
	};

	match interpreter.run(&name, &descriptor, &arguments) {
		Ok(Some(value)) => {
			if let Some(return_type) = &parsed.return_type {
				println!("{}", interpreter.display(value, return_type)?);
			}
			Ok(())
		},
		Ok(None) => Ok(()),
		Err(fault) => {
			warn!("{name}{descriptor} stopped with an unhandled error");
			Err(anyhow::Error::new(fault)
				.context(format!("failed to run {}.{name}{descriptor}", interpreter.class_name())))
		},
	}
}

#[derive(Debug, Parser)]
struct Cli {
	/// Be verbose, give twice for a trace of every executed instruction.
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	/// Don't log anything.
	#[arg(short = 'q', long = "quiet", global = true)]
	quiet: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Prints the contents of a class file
	Dump {
		path: PathBuf,
	},
	/// Runs a method of a class file
	Run {
		path: PathBuf,
		/// The method to run instead of `main`
		#[arg(long = "method", requires = "descriptor")]
		method: Option<String>,
		#[arg(long = "descriptor", requires = "method")]
		descriptor: Option<String>,
		/// How deep method calls may nest.
		#[arg(long = "max-depth", default_value_t = VmConfig::default().max_call_depth)]
		max_depth: usize,
		/// Log the disassembly of the method before running it.
		#[arg(long = "trace-disassembly")]
		trace_disassembly: bool,
		/// Passed to `main` as its `String[]`.
		#[arg(last = true)]
		arguments: Vec<String>,
	},
}
