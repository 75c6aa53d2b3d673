use super::*;

fn sample() -> ExpressionMatrix {
    // 3 x 4
    // [1 0 2 0]
    // [0 0 0 3]
    // [4 5 0 0]
    ExpressionMatrix::from_triplets(
        &[0, 0, 1, 2, 2],
        &[0, 2, 3, 0, 1],
        &[1, 2, 3, 4, 5],
        3,
        4,
    )
    .unwrap()
}

#[test]
fn test_from_triplets_accumulates_duplicates() {
    let m = ExpressionMatrix::from_triplets(&[0, 1, 0], &[2, 0, 2], &[3, 1, 4], 2, 3).unwrap();
    assert_eq!(m.format(), MatrixFormat::Csr);
    assert_eq!(m.get(0, 2), 7);
    assert_eq!(m.get(1, 0), 1);
    assert_eq!(m.nnz(), 2);
}

#[test]
fn test_from_triplets_rejects_out_of_bounds() {
    let err = ExpressionMatrix::from_triplets(&[0, 5], &[0, 0], &[1, 1], 2, 1).unwrap_err();
    assert_eq!(
        err,
        MatrixError::IndexOutOfBounds {
            axis: "row",
            index: 5,
            len: 2
        }
    );

    assert!(matches!(
        ExpressionMatrix::from_triplets(&[0], &[0, 1], &[1], 2, 2),
        Err(MatrixError::ShapeMismatch(_))
    ));
}

#[test]
fn test_format_conversions_preserve_values() {
    let csr = sample();
    let dense = csr.to_dense();
    let csc = csr.to_csc();

    assert_eq!(dense.format(), MatrixFormat::Dense);
    assert_eq!(csc.format(), MatrixFormat::Csc);
    assert_eq!(
        dense.dense_rows(),
        vec![vec![1, 0, 2, 0], vec![0, 0, 0, 3], vec![4, 5, 0, 0]]
    );
    assert_eq!(csc.dense_rows(), dense.dense_rows());
    assert_eq!(dense.to_csr(), csr);
    assert_eq!(csc.to_csr(), csr);
    assert_eq!(dense.to_csc(), csc);
}

#[test]
fn test_select_rows_keeps_format_and_allows_duplicates() {
    for m in [sample(), sample().to_csc(), sample().to_dense()] {
        let sub = m.select_rows(&[2, 0, 2]).unwrap();
        assert_eq!(sub.format(), m.format());
        assert_eq!(sub.shape(), (3, 4));
        assert_eq!(
            sub.dense_rows(),
            vec![vec![4, 5, 0, 0], vec![1, 0, 2, 0], vec![4, 5, 0, 0]]
        );
    }
}

#[test]
fn test_select_cols_keeps_format_and_allows_duplicates() {
    for m in [sample(), sample().to_csc(), sample().to_dense()] {
        let sub = m.select_cols(&[3, 0, 0]).unwrap();
        assert_eq!(sub.format(), m.format());
        assert_eq!(sub.shape(), (3, 3));
        assert_eq!(
            sub.dense_rows(),
            vec![vec![0, 1, 1], vec![3, 0, 0], vec![0, 4, 4]]
        );
    }
}

#[test]
fn test_select_out_of_bounds() {
    let m = sample();
    assert!(matches!(
        m.select_rows(&[3]),
        Err(MatrixError::IndexOutOfBounds { axis: "row", .. })
    ));
    assert!(matches!(
        m.select_cols(&[0, 4]),
        Err(MatrixError::IndexOutOfBounds { axis: "column", .. })
    ));
}

#[test]
fn test_empty_selection() {
    let sub = sample().select_rows(&[]).unwrap();
    assert_eq!(sub.shape(), (0, 4));
    assert_eq!(sub.nnz(), 0);
    assert!(sub.dense_rows().is_empty());
}

#[test]
fn test_sums_and_nnz_agree_across_formats() {
    for m in [sample(), sample().to_csc(), sample().to_dense()] {
        assert_eq!(m.row_sums().unwrap(), vec![3, 3, 9]);
        assert_eq!(m.col_sums().unwrap(), vec![5, 5, 2, 3]);
        assert_eq!(m.row_nnz(), vec![2, 1, 2]);
        assert_eq!(m.col_nnz(), vec![2, 1, 1, 1]);
    }
}

#[test]
fn test_from_compressed_validates() {
    let csc = ExpressionMatrix::from_compressed(
        MatrixFormat::Csc,
        (2, 2),
        vec![0, 1, 2],
        vec![1, 0],
        vec![9, 8],
    )
    .unwrap();
    assert_eq!(csc.get(1, 0), 9);
    assert_eq!(csc.get(0, 1), 8);

    let err = ExpressionMatrix::from_compressed(
        MatrixFormat::Csr,
        (2, 2),
        vec![0, 1],
        vec![0],
        vec![1],
    )
    .unwrap_err();
    assert!(matches!(err, MatrixError::InvalidStructure(_)));
}

#[test]
fn test_dense_from_rows() {
    let dense = DenseMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
    assert_eq!(dense.row(1), &[3, 4]);
    assert!(DenseMatrix::from_rows(vec![vec![1, 2], vec![3]]).is_err());
    assert!(DenseMatrix::new(2, 2, vec![1]).is_err());
}

#[test]
fn test_accumulation_overflow_is_an_error() {
    let big = Count::MAX / 2 + 1;
    let err = ExpressionMatrix::from_triplets(&[1, 1], &[0, 0], &[big, big], 2, 1).unwrap_err();
    assert_eq!(err, MatrixError::CountOverflow { major: 1, minor: 0 });
}

#[test]
fn test_sum_overflow_is_an_error() {
    let big = Count::MAX / 2 + 1;
    let m = ExpressionMatrix::from_triplets(&[0, 1], &[0, 0], &[big, big], 2, 2).unwrap();
    assert_eq!(m.row_sums().unwrap(), vec![big, big]);
    assert_eq!(m.col_sums(), Err(MatrixError::SumOverflow { lane: 0 }));
    assert_eq!(m.to_csc().col_sums(), Err(MatrixError::SumOverflow { lane: 0 }));
    assert_eq!(m.to_dense().col_sums(), Err(MatrixError::SumOverflow { lane: 0 }));
}

#[test]
fn test_shape_overflow_is_an_error() {
    assert!(DenseMatrix::new(usize::MAX, 2, Vec::new()).is_err());
    let err = ExpressionMatrix::from_compressed(
        MatrixFormat::Csr,
        (usize::MAX, 1),
        vec![0],
        Vec::new(),
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, MatrixError::InvalidStructure(_)));
}

#[test]
fn test_format_tags() {
    assert_eq!(MatrixFormat::Csr.encoding(), "csr_matrix");
    assert_eq!("csc_matrix".parse::<MatrixFormat>().unwrap(), MatrixFormat::Csc);
    assert_eq!("array".parse::<MatrixFormat>().unwrap(), MatrixFormat::Dense);
    assert!("coo_matrix".parse::<MatrixFormat>().is_err());
}
