//! Simulated Pin Tests

use pinwire::pin::{Level, PinActuator, PinFault, PinMode, SimulatedPins, DEFAULT_PIN_COUNT};

#[test]
fn test_default_bank() {
    let pins = SimulatedPins::default();
    assert_eq!(pins.pin_count(), DEFAULT_PIN_COUNT);
    assert_eq!(pins.mode(0), None);
    assert_eq!(pins.output_level(39), Some(Level::Low));
    assert_eq!(pins.output_level(40), None);
}

#[test]
fn test_invalid_pin() {
    let mut pins = SimulatedPins::new(4);
    let expected = PinFault::InvalidPin { pin: 4, count: 4 };

    assert_eq!(pins.set_mode(4, PinMode::Output), Err(expected.clone()));
    assert_eq!(pins.write(4, Level::High), Err(expected.clone()));
    assert_eq!(pins.read(4), Err(expected.clone()));
    assert_eq!(pins.set_input_level(4, Level::High), Err(expected));
}

#[test]
fn test_write_requires_output_mode() {
    let mut pins = SimulatedPins::new(4);
    assert_eq!(pins.write(1, Level::High), Err(PinFault::NotOutput(1)));

    pins.set_mode(1, PinMode::Input).unwrap();
    assert_eq!(pins.write(1, Level::High), Err(PinFault::NotOutput(1)));

    pins.set_mode(1, PinMode::Output).unwrap();
    pins.write(1, Level::High).unwrap();
    assert_eq!(pins.output_level(1), Some(Level::High));
}

#[test]
fn test_read_requires_input_mode() {
    let mut pins = SimulatedPins::new(4);
    assert_eq!(pins.read(2), Err(PinFault::NotInput(2)));

    pins.set_mode(2, PinMode::Output).unwrap();
    assert_eq!(pins.read(2), Err(PinFault::NotInput(2)));

    pins.set_mode(2, PinMode::Input).unwrap();
    assert_eq!(pins.read(2).unwrap(), Level::Low);
}

#[test]
fn test_input_level_is_independent_of_output() {
    let mut pins = SimulatedPins::new(4);
    pins.set_mode(3, PinMode::Output).unwrap();
    pins.write(3, Level::High).unwrap();

    pins.set_mode(3, PinMode::Input).unwrap();
    assert_eq!(pins.read(3).unwrap(), Level::Low);

    pins.set_input_level(3, Level::High).unwrap();
    assert_eq!(pins.read(3).unwrap(), Level::High);
    assert_eq!(pins.output_level(3), Some(Level::High));
}

#[test]
fn test_clones_share_state() {
    let mut device_side = SimulatedPins::new(8);
    let host_side = device_side.clone();

    device_side.set_mode(5, PinMode::Output).unwrap();
    device_side.write(5, Level::High).unwrap();
    assert_eq!(host_side.mode(5), Some(PinMode::Output));
    assert_eq!(host_side.output_level(5), Some(Level::High));

    host_side.set_input_level(6, Level::High).unwrap();
    device_side.set_mode(6, PinMode::Input).unwrap();
    assert_eq!(device_side.read(6).unwrap(), Level::High);
}

#[test]
fn test_shared_across_threads() {
    let pins = SimulatedPins::new(16);

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let mut pins = pins.clone();
            std::thread::spawn(move || {
                for pin in (t * 4)..(t * 4 + 4) {
                    pins.set_mode(pin, PinMode::Output).unwrap();
                    pins.write(pin, Level::from(pin % 2 == 0)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for pin in 0..16u8 {
        assert_eq!(pins.output_level(pin), Some(Level::from(pin % 2 == 0)));
    }
}

#[test]
fn test_level_conversions() {
    assert_eq!(Level::from(true), Level::High);
    assert_eq!(Level::default(), Level::Low);
    assert_eq!(Level::High.as_int(), 1);
    assert!(!Level::Low.is_high());
}
