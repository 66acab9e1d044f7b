//! Desktop host for the wallpaper bridge.

use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use waytree_core::{
    desktop_services, ui_channel, Conf, MethodCall, Reply, ScreenGeometry, Settings, WallpaperChannel,
    WallpaperRequest, WallpaperSetter, METHOD_SET_WALLPAPER,
};

#[derive(Parser)]
#[command(name = "waytree")]
#[command(about = "Compose a QR wallpaper and set it as the desktop background")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose the wallpaper and apply it
    Set(RequestArgs),
    /// Compose the wallpaper into a PNG without applying it
    Compose {
        #[command(flatten)]
        request: RequestArgs,
        /// Where to write the PNG
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the settings file location and its effective contents
    Config,
}

#[derive(Args)]
struct RequestArgs {
    /// Image to place in the middle of the wallpaper
    #[arg(long)]
    url: String,
    /// Label drawn above the image
    #[arg(long)]
    network_name: String,
    /// Code drawn below the image
    #[arg(long)]
    code_id: String,
    /// Override the screen width in pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,
    /// Override the screen height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,
    /// Override the screen density
    #[arg(long)]
    dpi: Option<u32>,
}

impl RequestArgs {
    fn screen_override(&self, settings: &Settings) -> Option<ScreenGeometry> {
        let base = settings.screen.unwrap_or_default();
        match (self.width, self.height, self.dpi) {
            (None, None, None) => settings.screen,
            (width, height, dpi) => Some(ScreenGeometry::new(
                width.unwrap_or(base.width_px),
                height.unwrap_or(base.height_px),
                dpi.unwrap_or(base.density_dpi),
            )),
        }
    }
}

fn init_logging() {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let conf = Conf::new()?;
    let mut settings = conf.load_settings()?;

    match cli.command {
        Command::Set(args) => {
            settings.screen = args.screen_override(&settings);
            set_wallpaper(&conf, settings, &args)
        }
        Command::Compose { request: args, output } => {
            settings.screen = args.screen_override(&settings);
            let setter = WallpaperSetter::new(desktop_services(&conf, &settings), settings.layout, settings.scope);
            let request = WallpaperRequest::new(args.url, args.network_name, args.code_id);
            let png = setter.compose(&request)?.to_png()?;
            std::fs::write(&output, png).with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
        Command::Config => {
            println!("{}", conf.settings_file.display());
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

/// Drive the bridge the way an app would: post the call, then pump the
/// main-thread queue until the reply arrives.
fn set_wallpaper(conf: &Conf, settings: Settings, args: &RequestArgs) -> Result<()> {
    let (handle, ui) = ui_channel();
    let setter = WallpaperSetter::new(desktop_services(conf, &settings), settings.layout, settings.scope);
    let channel = WallpaperChannel::new(setter, Arc::new(handle));

    let (reply_tx, reply_rx) = mpsc::channel();
    let call = MethodCall::new(
        METHOD_SET_WALLPAPER,
        json!({ "url": args.url, "networkName": args.network_name, "codeId": args.code_id }),
    );
    channel.handle(call, move |reply| {
        let _ = reply_tx.send(reply);
    });

    let reply = loop {
        if let Ok(reply) = reply_rx.try_recv() {
            break reply;
        }
        if !ui.run_one() {
            bail!("wallpaper worker exited without a reply");
        }
    };

    match reply {
        Reply::Success { .. } => {
            println!("Wallpaper set");
            Ok(())
        }
        Reply::Error { code, message, details } => {
            bail!("{code}: {message} ({})", details.unwrap_or_default())
        }
        Reply::NotImplemented => bail!("{METHOD_SET_WALLPAPER} is not implemented"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn request(cli: Cli) -> RequestArgs {
        match cli.command {
            Command::Set(args) => args,
            Command::Compose { request, .. } => request,
            Command::Config => panic!("no request"),
        }
    }

    const BASE: [&str; 8] = ["waytree", "set", "--url", "http://x/qr.png", "--network-name", "Home", "--code-id", "7"];

    #[test]
    fn no_override_keeps_settings_screen() {
        let settings = Settings { screen: Some(ScreenGeometry::new(800, 600, 96)), ..Settings::default() };
        assert_eq!(request(parse(&BASE)).screen_override(&settings), settings.screen);
    }

    #[test]
    fn dpi_alone_keeps_default_size() {
        let mut args = BASE.to_vec();
        args.extend(["--dpi", "320"]);
        let screen = request(parse(&args)).screen_override(&Settings::default());
        assert_eq!(screen, Some(ScreenGeometry::new(1080, 1920, 320)));
    }

    #[test]
    fn width_requires_height() {
        let mut args = BASE.to_vec();
        args.extend(["--width", "720"]);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn compose_takes_output_path() {
        let mut args = BASE.to_vec();
        args[1] = "compose";
        args.extend(["--width", "720", "--height", "1280", "-o", "out.png"]);
        let screen = request(parse(&args)).screen_override(&Settings::default());
        assert_eq!(screen, Some(ScreenGeometry::new(720, 1280, 420)));
    }
}
