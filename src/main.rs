use rusty_logic::components::{Clock, DipSwitch, Ic74hc161, Ic74hc283, Led, Memory};
use rusty_logic::{Bus, Circuit, Handle, MemoryImage, Result, SimConfig, Signal, WireId};
use std::cell::RefCell;
use std::env;
use std::ops::ControlFlow;
use std::rc::Rc;

const RISING_EDGES: usize = 20;

/// Table of squares modulo 256, indexed by the adder output
fn squares_image() -> MemoryImage {
    MemoryImage {
        addr_bits: 4,
        data_bits: 8,
        origin: 0,
        words: (0..16u32).map(|n| (n * n) % 256).collect(),
    }
}

struct Demo {
    circuit: Circuit,
    clock: Handle<Clock>,
    count: Bus,
    sum: Bus,
    data: Bus,
    carry: WireId,
    overflow: Handle<Led>,
}

/// Counter -> adder (+ DIP switch offset) -> memory lookup, all on one clock.
fn build(config: SimConfig, image: &MemoryImage, offset: u32) -> Result<Demo> {
    let hz = config.clock_hz;
    let mut circuit = Circuit::with_config(config);

    let vcc = circuit.named_wire("VCC");
    circuit.set_signal(vcc, Signal::High)?;
    let gnd = circuit.named_wire("GND");
    circuit.set_signal(gnd, Signal::Low)?;

    let clock = circuit.add(Clock::with_hz(hz))?;
    let counter = circuit.add(Ic74hc161::new())?;
    let adder = circuit.add(Ic74hc283::new())?;
    let dip = circuit.add(DipSwitch::new(4))?;
    let rom = circuit.add(Memory::new(4, 8))?;

    // Clock output and counter input negotiate their own shared wire
    let ck_out = circuit.pin(clock, "CK")?;
    let ck_in = circuit.pin(counter, "CK")?;
    circuit.connect_connector(ck_out, ck_in)?;

    for pin in ["CLR_B", "LD_B", "ENP", "ENT"] {
        circuit.connect(counter, pin, vcc)?;
    }
    let count = circuit.named_bus("Q", 4);
    let carry = circuit.named_wire("CO");
    counter.connect_output(&mut circuit, &count)?;
    circuit.connect(counter, "CO", carry)?;

    let offset_bus = circuit.named_bus("DIP", 4);
    dip.connect_bus(&mut circuit, &offset_bus)?;
    dip.set_value(&mut circuit, offset)?;

    let sum = circuit.named_bus("S", 4);
    let overflow_wire = circuit.named_wire("C4");
    adder.connect_a(&mut circuit, &count)?;
    adder.connect_b(&mut circuit, &offset_bus)?;
    adder.connect_s(&mut circuit, &sum)?;
    circuit.connect(adder, "C0", gnd)?;
    circuit.connect(adder, "C4", overflow_wire)?;
    let overflow = circuit.add_wired(Led::new(), &[overflow_wire.into()])?;

    let data = circuit.named_bus("D", 8);
    rom.connect_addr_bus(&mut circuit, &sum)?;
    rom.connect_data_bus(&mut circuit, &data)?;
    rom.program(&mut circuit, image)?;

    circuit.start()?;
    Ok(Demo {
        circuit,
        clock,
        count,
        sum,
        data,
        carry,
        overflow,
    })
}

fn format_value(value: Option<u32>) -> String {
    value.map_or_else(|| "X".to_string(), |v| v.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    println!("Rusty Logic - Counter / Adder / Memory Demo");
    println!("===========================================");

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => match SimConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                return;
            }
        },
        None => SimConfig {
            clock_hz: 10.0,
            ..SimConfig::default()
        },
    };
    let image = match args.get(2) {
        Some(path) => match MemoryImage::from_file(path) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("Failed to load memory image {}: {}", path, e);
                return;
            }
        },
        None => squares_image(),
    };

    let mut demo = match build(config, &image, 3) {
        Ok(demo) => demo,
        Err(e) => {
            eprintln!("Failed to build circuit: {}", e);
            return;
        }
    };

    println!("Components: {}", demo.circuit.component_count());
    println!("Wires: {}", demo.circuit.wire_count());
    println!();
    println!("Edge | Count | Sum | Data | CO | C4");
    println!("-----|-------|-----|------|----|---");

    let edges = Rc::new(RefCell::new(0usize));
    let seen = edges.clone();
    let (count, sum, data, carry, overflow) = (
        demo.count.clone(),
        demo.sum.clone(),
        demo.data.clone(),
        demo.carry,
        demo.overflow,
    );
    let listener = demo.clock.add_clock_listener(&mut demo.circuit, move |circuit, signal| {
        if signal != Signal::High {
            return ControlFlow::Continue(());
        }
        let mut edges = seen.borrow_mut();
        *edges += 1;
        println!(
            "{:4} | {:5} | {:3} | {:4} | {:2} | {}",
            *edges,
            format_value(count.value(circuit).ok().flatten()),
            format_value(sum.value(circuit).ok().flatten()),
            format_value(data.value(circuit).ok().flatten()),
            circuit.signal(carry).map_or('X', |s| s.to_char()),
            if overflow.is_lit(circuit).unwrap_or(false) { "*" } else { "" },
        );
        if *edges >= RISING_EDGES {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    if let Err(e) = listener {
        eprintln!("Failed to attach clock listener: {}", e);
        return;
    }

    let hz = demo.circuit.config().clock_hz;
    if let Err(e) = demo.clock.start(&mut demo.circuit, hz).await {
        eprintln!("Simulation error: {}", e);
        return;
    }

    println!();
    println!("Stopped after {} rising edges", edges.borrow());
}
