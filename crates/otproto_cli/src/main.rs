//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `otproto_core` linkage.
//! - Print a small deterministic-shape protocol document.

use otproto_core::{BuildResult, Mount, PipetteConfig, PipetteModel, Protocol};

fn main() {
    if let Err(err) = otproto_core::init_logging(otproto_core::default_log_level(), None) {
        eprintln!("logging disabled: {err}");
    }
    println!("otproto_core version={}", otproto_core::core_version());

    match build_demo().map(|protocol| protocol.to_json()) {
        Ok(Ok(json)) => println!("{json}"),
        Ok(Err(err)) => {
            log::error!("event=demo_export module=cli status=error error={err}");
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("event=demo_build module=cli status=error error={err}");
            std::process::exit(1);
        }
    }
}

fn build_demo() -> BuildResult<Protocol> {
    let mut protocol = Protocol::new()?;
    let block = protocol.load_labware("96-deep-well", "2", "culture_block")?;
    let rack = protocol.load_labware("tiprack-10ul", "3", "tiprack-10ul")?;
    let p10 = protocol.add_pipette(
        PipetteModel::P10Single,
        PipetteConfig::on(Mount::Left)
            .with_tip_racks([rack])
            .with_tip_model("tiprack-10ul"),
    )?;

    let source = protocol.well(block, 0)?;
    let target = protocol.well(block, 1)?;
    let mut pipette = protocol.pipette(p10)?;
    pipette.pick_up_tip(None)?;
    pipette.aspirate(10.0, source)?;
    pipette.dispense(10.0, target.top(2.0))?;
    pipette.drop_tip(None)?;

    Ok(protocol)
}
