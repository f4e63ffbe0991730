//! JSON persistence for the compressed matrix formats.
//!
//! A matrix is written as its dimensions, raw compressed arrays, lock
//! count and pruning tolerance.  Loading validates the arrays before a
//! matrix is built, so a corrupted file gives an `InvalidData` error and
//! never a malformed matrix.

use crate::algebra::compressed::CompressedStorage;
use crate::algebra::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

/// Read and write matrices as JSON files
pub trait MatrixJSONReadWrite: Sized {
    /// Writes `self` to `file` as JSON
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error>;
    /// Reads a matrix previously written by `save_to_file`
    fn load_from_file(file: &mut File) -> Result<Self, io::Error>;
}

// the compressed arrays of a matrix, with `outer` the
// number of compressed rows (CSR) or columns (CSC)
#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonCompressedData<T: FloatT> {
    pub m: usize,
    pub n: usize,
    pub offsets: Vec<usize>,
    pub indices: Vec<usize>,
    pub entries: Vec<T>,
    pub num_mutexes: usize,
    pub eps: T,
}

impl<T: FloatT> JsonCompressedData<T> {
    fn from_storage(m: usize, n: usize, s: &CompressedStorage<T>) -> Self {
        JsonCompressedData {
            m,
            n,
            offsets: s.offsets().to_vec(),
            indices: s.indices().to_vec(),
            entries: s.entries().to_vec(),
            num_mutexes: s.num_mutexes(),
            eps: s.eps,
        }
    }

    fn into_storage(self, nouter: usize, ninner: usize) -> Result<CompressedStorage<T>, io::Error> {
        CompressedStorage::from_parts(
            nouter,
            ninner,
            self.offsets,
            self.indices,
            self.entries,
            self.num_mutexes,
            self.eps,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn write_json<T>(data: &JsonCompressedData<T>, file: &mut File) -> Result<(), io::Error>
where
    T: FloatT + Serialize + DeserializeOwned,
{
    let json = serde_json::to_string(data)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn read_json<T>(file: &mut File) -> Result<JsonCompressedData<T>, io::Error>
where
    T: FloatT + Serialize + DeserializeOwned,
{
    let mut buffer = String::new();
    file.read_to_string(&mut buffer)?;
    let data: JsonCompressedData<T> = serde_json::from_str(&buffer)?;
    Ok(data)
}

impl<T> MatrixJSONReadWrite for CsrMatrix<T>
where
    T: FloatT + Serialize + DeserializeOwned,
{
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let data = JsonCompressedData::from_storage(self.nrows(), self.ncols(), &self.storage);
        write_json(&data, file)
    }

    fn load_from_file(file: &mut File) -> Result<Self, io::Error> {
        let data = read_json::<T>(file)?;
        let (m, n) = (data.m, data.n);
        Ok(CsrMatrix::from_storage(data.into_storage(m, n)?))
    }
}

impl<T> MatrixJSONReadWrite for CscMatrix<T>
where
    T: FloatT + Serialize + DeserializeOwned,
{
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let data = JsonCompressedData::from_storage(self.nrows(), self.ncols(), &self.storage);
        write_json(&data, file)
    }

    fn load_from_file(file: &mut File) -> Result<Self, io::Error> {
        let data = read_json::<T>(file)?;
        let (m, n) = (data.m, data.n);
        Ok(CscMatrix::from_storage(data.into_storage(n, m)?))
    }
}

#[test]
fn test_json_io_csr() {
    use std::io::{Seek, SeekFrom};

    let A = CsrMatrix::from_raw_parts(2, 3, vec![0, 2, 3], vec![0, 2, 1], vec![1.0, -2.0, 0.5])
        .unwrap();

    let mut file = tempfile::tempfile().unwrap();
    A.save_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let B = CsrMatrix::<f64>::load_from_file(&mut file).unwrap();
    assert_eq!(B.row_offsets(), A.row_offsets());
    assert_eq!(B.column_indices(), A.column_indices());
    assert_eq!(B.entries(), A.entries());
    assert_eq!(B.eps(), A.eps());
}

#[test]
fn test_json_io_rejects_bad_arrays() {
    use std::io::{Seek, SeekFrom};

    let mut file = tempfile::tempfile().unwrap();
    let json = r#"{"m":2,"n":2,"offsets":[0,2,1],"indices":[0,1],"entries":[1.0,2.0],"num_mutexes":1,"eps":0.0}"#;
    file.write_all(json.as_bytes()).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let err = CsrMatrix::<f64>::load_from_file(&mut file).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}
