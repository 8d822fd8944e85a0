use anyhow::Result;
use std::io::Write;

/// 搜索结果的精简 SAM 输出。核心部分每个命中只交出
/// `(读段名, 参考名, 0 起始位置, CIGAR, 读段, 质量串)`；
/// 所有 SAM 相关的细节（1 起始坐标、flag、占位列）都在这里。
pub struct SamWriter<W: Write> {
    out: W,
}

impl<W: Write> SamWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 每条参考序列一行 `@SQ` 头。
    pub fn write_header<'a>(&mut self, refs: impl IntoIterator<Item = (&'a str, usize)>) -> Result<()> {
        for (name, len) in refs {
            writeln!(self.out, "@SQ\tSN:{name}\tLN:{len}")?;
        }
        Ok(())
    }

    pub fn write_mapped(
        &mut self,
        qname: &str,
        rname: &str,
        pos: u32,
        cigar: &str,
        seq: &str,
        qual: &str,
    ) -> Result<()> {
        let qual = if qual.is_empty() { "*" } else { qual };
        writeln!(
            self.out,
            "{qname}\t0\t{rname}\t{}\t255\t{cigar}\t*\t0\t0\t{seq}\t{qual}",
            pos + 1, // SAM 坐标从 1 起
        )?;
        Ok(())
    }

    pub fn write_unmapped(&mut self, qname: &str, seq: &str, qual: &str) -> Result<()> {
        let qual = if qual.is_empty() { "*" } else { qual };
        writeln!(self.out, "{qname}\t4\t*\t0\t0\t*\t*\t0\t0\t{seq}\t{qual}")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_records() {
        let mut buf = Vec::new();
        {
            let mut sam = SamWriter::new(&mut buf);
            sam.write_header([("chr1", 8)]).unwrap();
            sam.write_mapped("r1", "chr1", 2, "2M1D1M", "gtc", "III").unwrap();
            sam.write_unmapped("r2", "nnnn", "").unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "@SQ\tSN:chr1\tLN:8");
        assert_eq!(lines[1], "r1\t0\tchr1\t3\t255\t2M1D1M\t*\t0\t0\tgtc\tIII");
        assert_eq!(lines[2], "r2\t4\t*\t0\t0\t*\t*\t0\t0\tnnnn\t*");
    }
}
