//! Blob objects: opaque content, no internal grammar.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn parse(data: &[u8]) -> Self {
        Blob { data: data.to_vec() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }
}
