extern crate rand;
extern crate tincture;

use rand::{thread_rng, Rng};
use tincture::prelude::*;

#[test]
fn virtual_indexing() {
    let mut rng = thread_rng();

    for _ in 0..20 {
        let columns = rng.gen_range(1, 5);
        let rows = rng.gen_range(1, 16);
        let repeat = rng.gen_range(1, 8);

        let values: Vec<f32> = (0..columns * rows).map(|_| rng.gen()).collect();
        let base = BufferData::from_values(columns, &values).unwrap();
        let instances = base.instances();

        let data = VirtualBufferData::new(base, repeat).unwrap();
        assert_eq!(data.len(), values.len() * repeat);
        assert_eq!(data.instances(), instances * repeat);
        assert_eq!(data.instance_length(), rows);

        for i in 0..data.len() {
            assert_eq!(data.get(i).unwrap(), values[i / repeat]);
        }

        assert!(data.get(data.len()).is_err());
        assert_eq!(&*data.data(), &values[..]);
    }
}

#[test]
fn virtual_products() {
    let base = BufferData::from_values(1, &[1.0, 2.0]).unwrap();
    let data = VirtualBufferData::new(base, 2).unwrap();
    let data = (data * 3).unwrap();
    assert_eq!(data.repeat(), 6);
    assert_eq!(data.instances(), 6);

    assert!((data * 0).is_err());
    assert!(VirtualBufferData::new(BufferData::new(1), 0).is_err());
}

#[test]
fn growth() {
    for &columns in &[1, 5] {
        let mut data = BufferData::new(columns);
        assert_eq!(data.capacity(), 10);

        for i in 0..25 {
            data.add(i as f32);
        }

        assert_eq!(data.len(), 25);
        assert_eq!(data.rows(), 25 / columns);
        assert!(data.capacity() >= 25);
        assert_eq!(data.get(24).unwrap(), 24.0);

        let changes = data.take_changes().unwrap();
        assert_eq!(changes.total(), 25);
        assert!(data.take_changes().is_none());

        data.clear();
        assert!(data.is_empty());
        assert_eq!(data.capacity(), 10);
    }
}

#[test]
fn arrays() {
    let a = BufferData::from_values(3, &[0.0; 9]).unwrap();
    let b = Polygon::new(vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 1.0, 0.0]).unwrap();
    let array = BufferedDataArray::new(vec![
        Box::new(a) as Box<dyn BufferedData>,
        Box::new(b) as Box<dyn BufferedData>,
    ]).unwrap();

    assert_eq!(array.columns(), 3);
    assert_eq!(array.len(), 18);
    assert_eq!(array.get(12).unwrap(), 2.0);
    assert_eq!(array.data().len(), 18);

    let mismatched = BufferData::from_values(2, &[0.0; 2]).unwrap();
    let c = BufferData::from_values(3, &[0.0; 3]).unwrap();
    assert!(BufferedDataArray::new(vec![
        Box::new(c) as Box<dyn BufferedData>,
        Box::new(mismatched) as Box<dyn BufferedData>,
    ]).is_err());
    assert!(BufferedDataArray::new(vec![]).is_err());
}

#[test]
fn mutable_writes() {
    let mut data = MutableBufferData::new(2, vec![0.0; 512]).unwrap();
    assert!(!data.is_dirty());

    data.set(0, 1.0).unwrap();
    data.set(3, 1.0).unwrap();
    data.set_row(200, &[4.0, 5.0]).unwrap();
    assert!(data.is_dirty());

    let changes = data.take_changes().unwrap();
    let ranges: Vec<(usize, usize)> = changes.iter().map(|v| (v.start(), v.end())).collect();
    assert_eq!(ranges, vec![(0, 4), (400, 402)]);
    assert!(!data.is_dirty());

    assert!(data.set(1024, 0.0).is_err());
    assert!(data.set_row(0, &[1.0]).is_err());
}
