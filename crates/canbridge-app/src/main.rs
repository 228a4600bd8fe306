mod listener;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use settings::Settings;

fn cli() -> App<'static, 'static> {
    let settings_arg = Arg::with_name("settings")
        .value_name("SETTINGS")
        .help("Settings file (default: <config dir>/canbridge/settings.json)")
        .index(1);

    App::new("canbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CAN bus to serial bridge and host-side packet listener")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("bridge")
                .about("Forward CAN frames to the serial link")
                .arg(settings_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("listen")
                .about("Decode packets arriving on the serial link")
                .arg(settings_arg),
        )
        .subcommand(SubCommand::with_name("ports").about("List serial ports"))
}

fn settings_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches.value_of_os("settings").map(PathBuf::from)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        ("bridge", Some(sub)) => run_bridge(Settings::load(settings_path(sub).as_deref())?),
        ("listen", Some(sub)) => listener::run(&Settings::load(settings_path(sub).as_deref())?.listen),
        ("ports", _) => {
            for port in canbridge_core::list_ports() {
                println!("{port}");
            }
            Ok(())
        }
        (other, _) => anyhow::bail!("unknown command {other:?}"),
    }
}

#[cfg(all(target_os = "linux", feature = "socketcan"))]
fn run_bridge(settings: Settings) -> Result<()> {
    use anyhow::Context;
    use canbridge_core::{Bridge, SerialPortTransport, SocketCanBus};

    let config = settings.bridge.to_config();
    config.validate()?;
    let transport = SerialPortTransport::open(config.serial.clone())
        .with_context(|| format!("failed to open {}", config.serial.port_name))?;
    let bridge = Bridge::init(SocketCanBus::new(), transport, config)?;
    bridge.run()
}

#[cfg(not(all(target_os = "linux", feature = "socketcan")))]
fn run_bridge(_settings: Settings) -> Result<()> {
    anyhow::bail!("no CAN driver in this build, rebuild on Linux with the `socketcan` feature")
}
