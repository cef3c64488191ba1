//! `Display` formatting for [`Matrix`].

use core::fmt;

use super::Matrix;

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "matrix([], shape=({}, {}))", self.rows, self.cols);
        }
        writeln!(f, "matrix([")?;
        for (r, row) in self.row_iter().enumerate() {
            write!(f, "  [")?;
            for (c, v) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                match f.precision() {
                    Some(p) => write!(f, "{v:.p$}")?,
                    None => write!(f, "{v}")?,
                }
            }
            if r + 1 < self.rows {
                writeln!(f, "],")?;
            } else {
                writeln!(f, "]")?;
            }
        }
        write!(f, "])")
    }
}
