use clap::Parser;
use famicore::config::RunConfig;
use famicore::{AddressMap, Console, CpuBus, ProgramImage, RESET_VECTOR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "famicore")]
#[command(about = "Run a flat 6502 program image until it parks in a self-loop")]
struct Args {
    /// Path to the flat binary image
    image_path: String,

    /// Fixture file describing load address, entry point and expectations
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print a trace line per instruction
    #[arg(long)]
    trace: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let mut config = match &args.fixture {
        Some(path) => match RunConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading fixture: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => RunConfig::default(),
    };
    config.trace |= args.trace;

    println!("Loading image: {}", args.image_path);
    let image = match ProgramImage::load(&args.image_path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error loading image: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Image size: {} bytes at {:#06X}", image.data.len(), config.load_addr);

    let mut console = Console::new(AddressMap::Flat);
    if let Err(e) = image.apply(&mut console.bus, config.load_addr) {
        eprintln!("Error loading image: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(entry) = config.entry {
        console.load_bytes(RESET_VECTOR, &[entry as u8, (entry >> 8) as u8]);
    }
    console.reset();
    console.set_trace(config.trace);

    if let Some(feedback) = config.feedback_addr {
        console.bus.write(feedback, 0);
    }

    let trap = run(&mut console, &config);

    match trap {
        Some(addr) => {
            println!(
                "Trapped at {:#06X} after {} CPU cycles ({} scheduler ticks)",
                addr,
                console.cpu.total_cycles,
                console.total_ticks()
            );
            match config.success_addr {
                Some(expected) if expected != addr => {
                    eprintln!("Expected trap at {:#06X}", expected);
                    ExitCode::FAILURE
                }
                _ => ExitCode::SUCCESS,
            }
        }
        None => {
            eprintln!("No trap within {} ticks", config.max_ticks);
            ExitCode::FAILURE
        }
    }
}

/// Drive the console until a self-loop or the tick budget runs out,
/// servicing the interrupt feedback register between instructions.
fn run(console: &mut Console, config: &RunConfig) -> Option<u16> {
    let feedback = config.feedback_addr;
    for _ in 0..config.max_ticks {
        let completed = console.tick();
        if !completed {
            continue;
        }
        if let Some(addr) = feedback {
            let value = console.bus.peek(addr);
            if value & 0x02 != 0 {
                console.bus.write(addr, value & !0x02);
                console.raise_nmi();
                continue;
            }
            if value & 0x01 != 0 {
                console.bus.write(addr, value & !0x01);
                console.raise_irq();
                continue;
            }
        }
        if console.trapped() {
            return Some(console.cpu.pc);
        }
    }
    None
}
