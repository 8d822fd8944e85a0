use anyhow::Result;
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub seq: String,
}

/// 流式 FASTA 解析器。序列字节原样保留（只剥掉换行和行内空白）：
/// 索引的字母表由文件实际出现的符号决定。
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false, peek_header: None }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                if self.reader.read_line(&mut self.buf)? == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if self.buf.starts_with('>') {
                    break self.buf[1..].trim().to_string();
                }
            }
        };

        // id 为首个空白前的部分，描述忽略
        let id = header
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        let mut seq = String::new();
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                self.done = true;
                break;
            }
            if self.buf.starts_with('>') {
                self.peek_header = Some(self.buf[1..].trim().to_string());
                break;
            }
            seq.extend(self.buf.chars().filter(|c| !c.is_whitespace()));
        }

        Ok(Some(FastaRecord { id, seq }))
    }

    /// 按文件顺序把整个文件读成 `(id, 序列)` 对。
    pub fn into_records(mut self) -> Result<Vec<FastaRecord>> {
        let mut records = Vec::new();
        while let Some(rec) = self.next_record()? {
            records.push(rec);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fasta() {
        let data = b">chr1 first\nacgTNN\n>chr2\naaa\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        // 原样保留大小写，不做 DNA 归一化
        assert_eq!(r1.seq, "acgTNN");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "chr2");
        assert_eq!(r2.seq, "aaa");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_fasta_with_crlf_and_wrapped_lines() {
        let data = b">chr1 desc\r\nac gt\r\nacgt\r\n>chr2\r\nttt\r\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.seq, "acgtacgt");
        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.seq, "ttt");
    }

    #[test]
    fn parse_fasta_with_leading_junk_lines() {
        let data = b"\n; comment\n>chr1\nacgt\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        assert_eq!(r1.seq, "acgt");
    }

    #[test]
    fn into_records_collects_in_order() {
        let data = b">a\nac\n>b\ngt\n";
        let recs = FastaReader::new(Cursor::new(&data[..])).into_records().unwrap();
        let ids: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
