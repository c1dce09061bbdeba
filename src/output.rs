//! This module is in charge of writing filled histograms to a text summary

use crate::{
    histogram::{Hist1D, HistogramManager},
    numeric::{reals, Float},
    Result,
};

use eyre::WrapErr;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    time::Duration,
};

// Number of significant digits in file output
const SIG_DIGITS: usize = (reals::DIGITS - 1) as usize;

/// Write the histograms of a manager to a file, with a short run summary
pub fn dump_histograms(
    hists: &HistogramManager,
    file_name: impl AsRef<Path>,
    num_events: usize,
    elapsed_time: Duration,
) -> Result<()> {
    let file_name = file_name.as_ref();
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .wrap_err("Failed to format the timestamp")?;

    let file = File::create(file_name)
        .wrap_err_with(|| format!("Failed to create {}", file_name.display()))?;
    let mut out = BufWriter::new(file);
    (|| -> io::Result<()> {
        writeln_hp(&mut out, &timestamp[..])?;
        writeln_hp(&mut out, ("Events processed", num_events))?;
        let elapsed_secs = elapsed_time.as_secs_f64() as Float;
        writeln_hp(&mut out, ("Elapsed time (s)", elapsed_secs))?;
        write_histograms(&mut out, hists)?;
        out.flush()
    })()
    .wrap_err_with(|| format!("Failed to write {}", file_name.display()))
}

/// Write one block per histogram, in booking order
pub fn write_histograms(out: &mut impl Write, hists: &HistogramManager) -> io::Result<()> {
    for (id, hist) in hists.iter() {
        writeln_hp(out, "---------------------------------------------")?;
        writeln_hp(out, ("Histogram", &hists.full_name(id)[..]))?;
        write_histogram(out, hist)?;
    }
    Ok(())
}

/// Write the statistics and non-empty bins of a histogram
fn write_histogram(out: &mut impl Write, hist: &Hist1D) -> io::Result<()> {
    let (x_min, x_max) = hist.range();
    writeln_hp(out, ("Title", hist.title()))?;
    writeln_hp(out, ("Number of bins", hist.n_bins()))?;
    writeln_hp(out, ("Lower edge", x_min))?;
    writeln_hp(out, ("Upper edge", x_max))?;
    writeln_hp(out, ("Entries", hist.entries() as usize))?;
    writeln_hp(out, ("Sum of weights", hist.sum_of_weights()))?;
    writeln_hp(out, ("Mean", hist.mean()))?;
    writeln_hp(out, ("RMS", hist.rms()))?;
    writeln_hp(out, ("Underflow", hist.underflow()))?;
    writeln_hp(out, ("Overflow", hist.overflow()))?;
    for (bin, content) in hist.filled_bins() {
        write!(out, "   {:>6} ", bin)?;
        write_engineering(out, hist.bin_low_edge(bin), SIG_DIGITS)?;
        write!(out, " ")?;
        write_engineering(out, content, SIG_DIGITS)?;
        write!(out, " ")?;
        write_engineering(out, hist.bin_error(bin), SIG_DIGITS)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Text output facility with a leading space and key-value alignment
fn writeln_hp(out: &mut impl Write, data: impl WriteHp) -> io::Result<()> {
    write!(out, " ")?;
    data.write(out)?;
    writeln!(out)
}

/// Trait implemented by things which can be printed in summary files
trait WriteHp: Sized {
    /// Write down `self` to the output
    fn write(self, out: &mut impl Write) -> io::Result<()>;
}

impl WriteHp for &str {
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl WriteHp for usize {
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl WriteHp for Float {
    // Close to C's %g
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write_engineering(out, self, SIG_DIGITS)
    }
}

impl WriteHp for Option<Float> {
    // Statistics of empty histograms are undefined
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Some(x) => x.write(out),
            None => write!(out, "-"),
        }
    }
}

impl<T: WriteHp> WriteHp for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{:<31}: ", self.0)?;
        self.1.write(out)
    }
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn write_engineering(writer: &mut impl Write, x: Float, sig_digits: usize) -> io::Result<()> {
    let mut precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        write!(writer, "0")
    } else if !x.is_finite() {
        write!(writer, "{}", x)
    } else {
        // Otherwise, use log to evaluate order of magnitude
        let log_x = x.abs().log10();
        if log_x >= -3. && log_x <= (sig_digits as Float) {
            // Rust's precision counts digits after the decimal point, so it
            // must shrink as magnitude grows to keep significant digits fixed
            precision = (precision as isize - log_x.trunc() as isize).max(0) as usize;

            // The leading zero of numbers below 1 is not significant
            if log_x < 0. {
                precision += 1
            }

            // No trailing zeros or decimal point in naive notation
            let str_with_zeros = format!("{:.1$}", x, precision);
            if str_with_zeros.contains('.') {
                write!(
                    writer,
                    "{}",
                    str_with_zeros.trim_end_matches('0').trim_end_matches('.')
                )
            } else {
                write!(writer, "{}", str_with_zeros)
            }
        } else {
            write!(writer, "{:.1$e}", x, precision)
        }
    }
}
