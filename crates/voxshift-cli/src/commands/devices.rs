//! Audio device listing.

use clap::Args;
use voxshift_io::{AudioDevice, default_device, list_devices, select_devices};

#[derive(Args)]
pub struct DevicesArgs {
    /// Only show the routing `live --auto-route` would pick
    #[arg(long)]
    route: bool,
}

fn print_group(title: &str, devices: &[&AudioDevice], other_flag: impl Fn(&AudioDevice) -> bool, other: &str) {
    if devices.is_empty() {
        return;
    }
    println!("{title}:");
    for (idx, device) in devices.iter().enumerate() {
        let also = if other_flag(device) {
            format!(" (also {other})")
        } else {
            String::new()
        };
        println!(
            "  [{}] {} ({} Hz){}",
            idx, device.name, device.default_sample_rate, also
        );
    }
    println!();
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_devices()?;
    let route = select_devices(&devices);

    if !args.route {
        if devices.is_empty() {
            println!("No audio devices found.");
            return Ok(());
        }

        println!("Available Audio Devices");
        println!("=======================\n");

        let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();
        let outputs: Vec<_> = devices.iter().filter(|d| d.is_output).collect();
        print_group("Input Devices", &inputs, |d| d.is_output, "output");
        print_group("Output Devices", &outputs, |d| d.is_input, "input");

        let (default_input, default_output) = default_device()?;
        if let Some(device) = default_input {
            println!("Default input:  {}", device.name);
        }
        if let Some(device) = default_output {
            println!("Default output: {}", device.name);
        }
        println!();
    }

    println!("Suggested routing:");
    println!(
        "  Microphone: {}",
        route.input.as_deref().unwrap_or("<system default>")
    );
    println!(
        "  Output:     {}",
        route.output.as_deref().unwrap_or("<system default>")
    );
    if route.output.is_none() {
        println!();
        println!("Tip: install a virtual audio cable to use the changed voice in other apps.");
    }
    Ok(())
}
