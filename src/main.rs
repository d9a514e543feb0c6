// SPDX-License-Identifier: MPL-2.0
use facemotion::app::{self, Flags};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
FaceMotion: animate a face photo with a live-portrait service

USAGE:
  facemotion [OPTIONS] [IMAGE]

OPTIONS:
  --lang <LOCALE>       Interface language (e.g. en-US, fr)
  --config-dir <DIR>    Directory holding settings.toml
  --data-dir <DIR>      Directory for session state and generated videos
  -h, --help            Print this help

ENVIRONMENT:
  FACEMOTION_API_KEY    Key for the animation service
  RUST_LOG              Log filter (default: info)
";

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let flags = Flags {
        lang: optional_value(&mut args, "--lang"),
        config_dir: optional_value(&mut args, "--config-dir"),
        data_dir: optional_value(&mut args, "--data-dir"),
        file_path: args
            .finish()
            .into_iter()
            .next()
            .and_then(|s| s.into_string().ok()),
    };

    app::paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone());

    app::run(flags)
}

fn optional_value(args: &mut pico_args::Arguments, key: &'static str) -> Option<String> {
    args.opt_value_from_str(key).unwrap_or_else(|err| {
        tracing::warn!(flag = key, error = %err, "ignoring invalid argument");
        None
    })
}
