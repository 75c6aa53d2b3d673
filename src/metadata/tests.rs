use super::*;
use crate::geometry::{Point, Polygon};
use crate::matrix::ExpressionMatrix;

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_sub_set_slices_all_columns() {
    let mut cells = CellTable::new(names(&["c0", "c1", "c2"]));
    cells.total_counts = Some(vec![1.0, 2.0, 3.0]);
    cells.cell_point = Some(vec![
        Polygon::new(vec![Point::new(0.0, 0.0)]),
        Polygon::new(vec![Point::new(1.0, 1.0)]),
        Polygon::new(vec![Point::new(2.0, 2.0)]),
    ]);

    cells.sub_set(&[2, 0, 2]).unwrap();

    assert_eq!(cells.names(), &names(&["c2", "c0", "c2"])[..]);
    assert_eq!(cells.total_counts, Some(vec![3.0, 1.0, 3.0]));
    assert_eq!(cells.pct_counts_mt, None);
    let points = cells.cell_point.as_ref().unwrap();
    assert_eq!(points[1].vertices(), &[Point::new(0.0, 0.0)]);
    assert!(cells.validate().is_ok());
}

#[test]
fn test_sub_set_out_of_bounds_leaves_table_untouched() {
    let mut genes = GeneTable::new(names(&["g0", "g1"]));
    genes.n_counts = Some(vec![4.0, 5.0]);
    let before = genes.clone();

    let err = genes.sub_set(&[0, 2]).unwrap_err();
    assert_eq!(err, MetadataError::IndexOutOfBounds { index: 2, len: 2 });
    assert_eq!(genes, before);
}

#[test]
fn test_validate_names_the_column() {
    let mut cells = CellTable::new(names(&["a", "b"]));
    cells.pct_counts_mt = Some(vec![0.0]);
    let err = cells.validate().unwrap_err();
    assert!(err.to_string().contains("pct_counts_mt"));
}

#[test]
fn test_positions_of() {
    let genes = GeneTable::new(names(&["G1", "G2", "G3"]));
    assert_eq!(genes.position_of("G2"), Some(1));
    assert_eq!(genes.positions_of(&["G3", "G1"]).unwrap(), vec![2, 0]);
    assert_eq!(
        genes.positions_of(&["G1", "G9"]),
        Err(MetadataError::NameNotFound("G9".to_string()))
    );
}

#[test]
fn test_attribute_names_parse() {
    assert_eq!(
        "n_genes_by_counts".parse::<CellAttribute>().unwrap(),
        CellAttribute::NGenesByCounts
    );
    assert_eq!("n_cells".parse::<GeneAttribute>().unwrap(), GeneAttribute::NCells);
    assert!("n_cells".parse::<CellAttribute>().is_err());

    let mut genes = GeneTable::new(names(&["g"]));
    genes.set_scalar_column("n_counts", vec![9.0]).unwrap();
    assert_eq!(genes.scalar_columns(), vec![("n_counts", &[9.0][..])]);
    assert!(genes.set_scalar_column("bogus", vec![1.0]).is_err());
}

#[test]
fn test_fill_qc() {
    // rows: c0 = [MT-CO1: 2, Actb: 6], c1 = [0, 0]
    let matrix = ExpressionMatrix::from_triplets(&[0, 0], &[0, 1], &[2, 6], 2, 2).unwrap();
    let mut genes = GeneTable::new(names(&["mt-Co1", "Actb"]));
    let mut cells = CellTable::new(names(&["c0", "c1"]));

    cells.fill_qc(&matrix, &genes).unwrap();
    genes.fill_qc(&matrix).unwrap();

    assert_eq!(cells.total_counts, Some(vec![8.0, 0.0]));
    assert_eq!(cells.n_genes_by_counts, Some(vec![2.0, 0.0]));
    assert_eq!(cells.pct_counts_mt, Some(vec![25.0, 0.0]));
    assert_eq!(genes.n_cells, Some(vec![1.0, 1.0]));
    assert_eq!(genes.n_counts, Some(vec![2.0, 6.0]));
}

#[test]
fn test_fill_qc_shape_mismatch() {
    let matrix = ExpressionMatrix::from_triplets(&[0], &[0], &[1], 1, 1).unwrap();
    let genes = GeneTable::new(names(&["g"]));
    let mut cells = CellTable::new(names(&["a", "b"]));
    assert!(matches!(
        cells.fill_qc(&matrix, &genes),
        Err(MetadataError::LengthMismatch { .. })
    ));
}
