//! Keyboard backlight CLI tool.
//!
//! Drives the vendor lighting protocol of ITE-based laptop keyboards over
//! USB: 8-byte command frames as control transfers, per-key color matrices
//! as bulk transfers. Run with `RUST_LOG=debug` to trace the exact wire
//! traffic.

use std::process;

use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgGroup,
    ArgMatches, Command,
};

use crate::controller::ControlCenter;
use crate::device::{AllowList, Keyboard};
use crate::error::{Result, SelectionError};
use crate::style::{BrightnessLevel, SpeedLevel};

mod colors;
mod controller;
mod device;
mod error;
mod frame;
mod style;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(err) = run(&cli().get_matches()) {
        eprintln!("\x1b[31mError:\x1b[0m {err}");
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let keyboards = device::discover(&allow_list(matches))?;

    if matches.get_flag("list-devices") {
        for (i, keyboard) in keyboards.iter().enumerate() {
            println!(
                "[{}] vendor=0x{:04x} product=0x{:04x}",
                i + 1,
                keyboard.vendor_id(),
                keyboard.product_id()
            );
        }
        return Ok(());
    }

    let index = matches.get_one::<usize>("device").copied();
    let keyboard = select_keyboard(keyboards, index)?;
    let mut control = ControlCenter::new(keyboard);

    let brightness = match matches.get_one::<u8>("brightness") {
        Some(&level) => Some(BrightnessLevel::new(level)?),
        None => None,
    };
    let speed = match matches.get_one::<u8>("speed") {
        Some(&speed) => SpeedLevel::new(speed)?,
        None => SpeedLevel::default(),
    };

    if matches.get_flag("disable") {
        control.disable()
    } else if let Some(token) = matches.get_one::<String>("style") {
        control.set_style(token, brightness.unwrap_or_default(), speed)
    } else {
        // Color-table operations honor an explicit brightness first; without
        // one the control center bootstraps the default on demand.
        if brightness.is_some() {
            control.set_brightness(brightness)?;
        }

        if let Some(name) = matches.get_one::<String>("color") {
            control.set_mono_color(name)
        } else if let Some(pair) = matches.get_many::<String>("horizontal-alt") {
            let pair: Vec<&String> = pair.collect();
            control.set_horizontal_alt(pair[0], pair[1])
        } else {
            let pair: Vec<&String> =
                matches.get_many::<String>("vertical-alt").expect("operation group").collect();
            control.set_vertical_alt(pair[0], pair[1])
        }
    }
}

/// Build the vendor/product allow-list from the CLI modifiers.
fn allow_list(matches: &ArgMatches) -> AllowList {
    let vendor = matches.get_one::<u16>("vendor-id").copied();
    let product = matches.get_one::<u16>("product-id").copied();

    match (vendor, product) {
        (Some(vendor), product) => AllowList::single(vendor, product),
        (None, Some(product)) => AllowList::single(device::DEFAULT_VENDOR, Some(product)),
        (None, None) => AllowList::builtin(),
    }
}

/// Pick the target keyboard: an explicit 1-based index must be in range,
/// otherwise exactly one device must be present.
fn select_keyboard(mut keyboards: Vec<Keyboard>, index: Option<usize>) -> Result<Keyboard> {
    let index = selection_index(keyboards.len(), index)?;
    Ok(keyboards.swap_remove(index))
}

/// Selection rules, separated from the device list for testability.
fn selection_index(count: usize, requested: Option<usize>) -> Result<usize> {
    match requested {
        Some(index) if index == 0 || index > count => {
            Err(SelectionError::IndexOutOfRange { index, count }.into())
        },
        Some(index) => Ok(index - 1),
        None => match count {
            0 => Err(SelectionError::NoDevice.into()),
            1 => Ok(0),
            count => Err(SelectionError::Ambiguous(count).into()),
        },
    }
}

/// Parse a USB id given as decimal or 0x-prefixed hex.
fn parse_usb_id(id: &str) -> std::result::Result<u16, String> {
    let parsed = match id.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => id.parse(),
    };

    parsed.map_err(|_| format!("'{id}' is not a USB id (decimal or 0x-prefixed hex)"))
}

/// Get clap CLI parameters.
fn cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .disable_version_flag(true)
        .about(crate_description!())
        .arg(
            Arg::new("list-devices")
                .help("List all matching devices")
                .long("list-devices")
                .short('l')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("color")
                .help("Single color for all keys")
                .long("color")
                .short('c')
                .value_name("COLOR"),
        )
        .arg(
            Arg::new("horizontal-alt")
                .help("Two colors for alternating horizontal stripes")
                .long("horizontal-alt")
                .short('H')
                .num_args(2)
                .value_names(["COLOR_A", "COLOR_B"]),
        )
        .arg(
            Arg::new("vertical-alt")
                .help("Two colors for alternating vertical stripes")
                .long("vertical-alt")
                .short('V')
                .num_args(2)
                .value_names(["COLOR_A", "COLOR_B"]),
        )
        .arg(
            Arg::new("style")
                .help(
                    "Animation style: one of rainbow, marquee, wave, raindrop, aurora, random, \
                     reactive, breathing, ripple, reactiveripple, reactiveaurora, fireworks. \
                     Append a color letter (r, o, y, g, b, t, p) to styles that take one, e.g. \
                     rippler for a red ripple",
                )
                .long("style")
                .short('s')
                .value_name("STYLE"),
        )
        .arg(
            Arg::new("disable")
                .help("Turn the keyboard backlight off")
                .long("disable")
                .short('d')
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("operation")
                .args(["list-devices", "color", "horizontal-alt", "vertical-alt", "style", "disable"])
                .required(true),
        )
        .arg(
            Arg::new("vendor-id")
                .help("Vendor id (e.g. 1165 or 0x048d)")
                .long("vendor-id")
                .value_parser(parse_usb_id),
        )
        .arg(
            Arg::new("product-id")
                .help("Product id (e.g. 0xce00)")
                .long("product-id")
                .value_parser(parse_usb_id),
        )
        .arg(
            Arg::new("device")
                .help("Select a device by 1-based index; see --list-devices")
                .long("device")
                .short('D')
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("brightness")
                .help("Brightness, 1 (minimum) to 4 (maximum)")
                .long("brightness")
                .short('b')
                .value_parser(value_parser!(u8).range(1..=4)),
        )
        .arg(
            Arg::new("speed")
                .help("Style speed, 1 (fastest) to 10 (slowest)")
                .long("speed")
                .value_parser(value_parser!(u8).range(1..=10)),
        )
}
