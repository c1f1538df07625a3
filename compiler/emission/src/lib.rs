use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lir::*;

type IOResult = std::io::Result<()>;

/// Writes the listing for `stream` to `path`, replacing any existing file
pub fn output(path: impl AsRef<Path>, stream: &InstructionStream, frame_words: u16) -> IOResult {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    emit_listing(&mut writer, stream, frame_words)?;

    writer.flush()
}

pub fn emit_listing<W: Write>(
    writer: &mut W,
    stream: &InstructionStream,
    frame_words: u16,
) -> IOResult {
    emit_frame_note(writer, frame_words)?;

    for instruction in stream {
        emit_instruction(writer, instruction)?;
    }

    Ok(())
}

fn emit_instruction<W: Write>(writer: &mut W, instruction: &Instruction) -> IOResult {
    writeln!(writer, "\t{}", instruction)
}

fn emit_frame_note<W: Write>(writer: &mut W, frame_words: u16) -> IOResult {
    writeln!(writer, "; frame: {} words", frame_words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_has_header_and_one_line_per_instruction() {
        let mut stream = InstructionStream::new();
        stream.push(Instruction::MovImm {
            dest: Register::R4,
            imm: 3,
        });
        stream.push(Instruction::Push(Register::R4));

        let mut out = Vec::new();
        emit_listing(&mut out, &stream, 1).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "; frame: 1 words\n\tmovi r4, #3\n\tpush r4\n"
        );
    }

    #[test]
    fn empty_stream_is_just_the_header() {
        let mut out = Vec::new();
        emit_listing(&mut out, &InstructionStream::new(), 0).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "; frame: 0 words\n");
    }

    #[test]
    fn output_writes_the_file() {
        let path = std::env::temp_dir().join(format!("emission-{}.lst", std::process::id()));
        let mut stream = InstructionStream::new();
        stream.push(Instruction::Push(Register::R0));

        output(&path, &stream, 1).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written, "; frame: 1 words\n\tpush r0\n");
    }
}
