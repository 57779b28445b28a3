//! Utility functions used in all other glasserplot modules.

use std::path::Path;
use std::io::{Read, Write};

use crate::error::{Result};

use byteordered::byteorder::{ReadBytesExt, WriteBytesExt};

/// Check whether the file extension ends with ".gz".
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}


/// Check whether the file is a GIFTI file, i.e., its name ends with ".gii" or ".gii.gz".
pub fn is_gifti_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| {
            let name = a.to_string_lossy();
            name.ends_with(".gii") || name.ends_with(".gii.gz")
        })
        .unwrap_or(false)
}


/// Read a FreeSurfer info line from the input. The line is terminated by two consecutive '\n' chars,
/// which are consumed but not part of the returned String.
pub fn read_info_line<S>(input: &mut S) -> Result<String>
where
    S: Read,
{
    let mut info_line = String::new();
    let mut prev_char = '\0';
    loop {
        let cur_char = input.read_u8()? as char;
        if cur_char == '\n' && prev_char == '\n' {
            info_line.pop();
            break;
        }
        info_line.push(cur_char);
        prev_char = cur_char;
    }
    Ok(info_line)
}


/// Write an info line followed by the two '\n' terminator chars.
pub fn write_info_line<W>(output: &mut W, info_line: &str) -> Result<()>
where
    W: Write,
{
    output.write_all(info_line.as_bytes())?;
    output.write_all(b"\n\n")?;
    Ok(())
}


/// Read a fixed length zero-terminated byte string of the given length from the input. Embedded '\0' chars are allowed, but not added to the returned String.
pub fn read_fixed_length_string<S>(input: &mut S, len: usize) -> Result<String>
where
    S: Read,
{
    let mut info_line = String::with_capacity(len);
    for _  in 0..len   {
        let cur_char = input.read_u8()? as char;
        if cur_char != '\0'  {
            info_line.push(cur_char);
        }
    }
    Ok(info_line)
}


/// Write a string as a zero-terminated byte string, preceded by its length (including the '\0') as big endian i32.
pub fn write_length_prefixed_string<W>(output: &mut W, s: &str) -> Result<()>
where
    W: Write,
{
    output.write_i32::<byteordered::byteorder::BigEndian>(s.len() as i32 + 1)?;
    output.write_all(s.as_bytes())?;
    output.write_u8(0)?;
    Ok(())
}
