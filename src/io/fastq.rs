use anyhow::{anyhow, Result};
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub name: String,
    pub read: String,
    pub qual: String,
}

/// 流式四行 FASTQ 解析器。
pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false }
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        Ok(self.reader.read_line(&mut self.buf)?)
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        if self.done {
            return Ok(None);
        }

        if self.read_line()? == 0 {
            self.done = true;
            return Ok(None);
        }
        if !self.buf.starts_with('@') {
            return Err(anyhow!("FASTQ header not starting with '@'"));
        }
        let name = self.buf[1..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        if self.read_line()? == 0 {
            return Err(anyhow!("unexpected EOF after header"));
        }
        let read = self.buf.trim_end().to_string();

        if self.read_line()? == 0 || !self.buf.starts_with('+') {
            return Err(anyhow!("missing '+' line"));
        }

        if self.read_line()? == 0 {
            return Err(anyhow!("missing quality line"));
        }
        let qual = self.buf.trim_end().to_string();
        if qual.len() != read.len() {
            return Err(anyhow!("seq/qual length mismatch"));
        }

        Ok(Some(FastqRecord { name, read, qual }))
    }

    /// 按文件顺序对每条记录调用 `cb`。
    pub fn for_each(mut self, mut cb: impl FnMut(&FastqRecord)) -> Result<()> {
        while let Some(rec) = self.next_record()? {
            cb(&rec);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fastq() {
        let data = b"@read1 extra\nacgt\n+\nIIII\n@read2\ntt\n+read2\nII\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name, "read1");
        assert_eq!(r1.read, "acgt");
        assert_eq!(r1.qual, "IIII");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.name, "read2");
        assert_eq!(r2.read, "tt");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn reject_malformed_records() {
        let missing_plus = b"@r\nacgt\nIIII\n";
        let mut r = FastqReader::new(Cursor::new(&missing_plus[..]));
        assert!(r.next_record().is_err());

        let length_mismatch = b"@r\nacgt\n+\nII\n";
        let mut r = FastqReader::new(Cursor::new(&length_mismatch[..]));
        assert!(r.next_record().is_err());
    }

    #[test]
    fn for_each_visits_all_records() {
        let data = b"@a\nac\n+\nII\n@b\ngt\n+\nII\n";
        let mut names = Vec::new();
        FastqReader::new(Cursor::new(&data[..]))
            .for_each(|rec| names.push(rec.name.clone()))
            .unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }
}
