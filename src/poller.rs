//! The monitor task loop.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_io::{Read, ReadReady, Write};
use heapless::String;

use crate::bq76920::{Bq76920, Error};
use crate::config::MonitorConfig;
use crate::shell::{self, LineReader};
use crate::soc::ChargeEstimator;
use crate::status::StatusReporter;
use crate::time::Monotonic;

/// The battery-monitor task: sole owner of the device handle, the serial
/// channel, the line buffer and the charge state.
///
/// One cycle recovers a latched receiver fault, collects a command line with
/// a timeout, runs the charge estimator (reporting current and SoC on
/// success) and dispatches the line, if any, to the shell. Nothing in a cycle
/// is fatal; [`Poller::run`] never exits.
pub struct Poller<I2C, S, D, M> {
    bq: Bq76920<I2C>,
    serial: S,
    delay: D,
    clock: M,
    reader: LineReader,
    estimator: ChargeEstimator,
    reporter: StatusReporter,
}

impl<I2C, E, S, D, M> Poller<I2C, S, D, M>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    S: Read + ReadReady + Write,
    D: DelayNs,
    M: Monotonic,
{
    pub fn new(bq: Bq76920<I2C>, serial: S, delay: D, clock: M, config: MonitorConfig) -> Self {
        Self {
            bq,
            serial,
            delay,
            clock,
            reader: LineReader::new(config.line_timeout_ms),
            estimator: ChargeEstimator::new(&config),
            reporter: StatusReporter::new(Default::default(), config.thermistor),
        }
    }

    /// Device bring-up: enable the measurement blocks and latch the factory
    /// ADC calibration for all later status reports.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.bq.enable(&mut self.delay)?;
        let cal = self.bq.read_calibration()?;
        self.reporter.set_calibration(cal);
        Ok(())
    }

    /// One poll cycle. Serial write errors end the cycle early; everything
    /// else is handled inside.
    pub fn poll_once(&mut self) -> Result<(), S::Error> {
        // A latched receiver fault shows up as an error on the readiness
        // check; note it and carry on, the channel reports it only once.
        if self.serial.read_ready().is_err() {
            self.serial.write_all(b"UART Overrun cleared\r\n")?;
        }

        let line = self
            .reader
            .read_line(&mut self.serial, &mut self.delay, &self.clock);

        if let Some(sample) = self.estimator.update(&mut self.bq, self.clock.now()) {
            let mut s: String<48> = String::new();
            let _ = write!(
                &mut s,
                "Current: {:.2} A | SoC: {:.2} %\r\n",
                sample.current_a, sample.soc_percent
            );
            self.serial.write_all(s.as_bytes())?;
        }

        if let Some(line) = line.filter(|l| !l.is_empty()) {
            shell::execute(&mut self.bq, &self.reporter, &mut self.serial, line)?;
        }

        Ok(())
    }

    /// Poll forever. No condition in the subsystem terminates the task.
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.poll_once();
        }
    }

    pub fn estimator(&self) -> &ChargeEstimator {
        &self.estimator
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    /// Tear down into the owned channel handles.
    pub fn release(self) -> (I2C, S) {
        (self.bq.release(), self.serial)
    }
}
