//! Property tests for binning and subsetting invariants.

use proptest::prelude::*;
use stereo_exp::binning::GridBinner;
use stereo_exp::prelude::*;

fn points() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((-1_000i64..1_000, -1_000i64..1_000), 1..40)
}

/// Random sparse dataset with matching metadata.
fn dataset() -> impl Strategy<Value = StereoExpData> {
    (1usize..8, 1usize..6)
        .prop_flat_map(|(n_rows, n_cols)| {
            let triplet = (0..n_rows, 0..n_cols, 1u64..20);
            (
                Just(n_rows),
                Just(n_cols),
                prop::collection::vec(triplet, 0..30),
            )
        })
        .prop_map(|(n_rows, n_cols, triplets)| {
            let rows: Vec<usize> = triplets.iter().map(|t| t.0).collect();
            let cols: Vec<usize> = triplets.iter().map(|t| t.1).collect();
            let values: Vec<u64> = triplets.iter().map(|t| t.2).collect();
            let matrix =
                ExpressionMatrix::from_triplets(&rows, &cols, &values, n_rows, n_cols).unwrap();
            StereoExpData::from_parts(DatasetParts {
                matrix,
                cells: CellTable::new((0..n_rows).map(|i| format!("c{i}")).collect()),
                genes: GeneTable::new((0..n_cols).map(|j| format!("g{j}")).collect()),
                position: (0..n_rows).map(|i| [i as f64, -(i as f64)]).collect(),
                bin_type: None,
                bin_size: 100,
            })
            .unwrap()
        })
}

proptest! {
    #[test]
    fn hull_centroid_ignores_point_order(mut pts in points(), seed in any::<u64>()) {
        let as_points = |v: &[(i64, i64)]| -> Vec<Point> {
            v.iter().map(|&(x, y)| Point::new(x as f64, y as f64)).collect()
        };
        let before = convex_hull(&as_points(&pts));

        // Deterministic shuffle driven by the seed
        let len = pts.len();
        let mut state = seed | 1;
        for i in (1..len).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            pts.swap(i, (state % (i as u64 + 1)) as usize);
        }
        let after = convex_hull(&as_points(&pts));

        prop_assert_eq!(before.vertices(), after.vertices());
        prop_assert_eq!(before.centroid(), after.centroid());
    }

    #[test]
    fn grid_bins_cover_every_point(pts in points(), size in 1u32..300) {
        let xs: Vec<i64> = pts.iter().map(|p| p.0).collect();
        let ys: Vec<i64> = pts.iter().map(|p| p.1).collect();
        let binner = GridBinner::new(size).unwrap();
        let assignment = binner.bin(&xs, &ys, None).unwrap();

        prop_assert_eq!(assignment.point_cells.len(), xs.len());
        let x_min = *xs.iter().min().unwrap();
        let y_min = *ys.iter().min().unwrap();
        for (i, &cell) in assignment.point_cells.iter().enumerate() {
            let expected = format!(
                "{}_{}",
                binner.bin_coord(xs[i], x_min).unwrap(),
                binner.bin_coord(ys[i], y_min).unwrap()
            );
            prop_assert_eq!(&assignment.cells[cell].id, &expected);
        }
    }

    #[test]
    fn subsetting_keeps_axes_aligned(
        data in dataset(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let n = data.n_cells();
        let index: Vec<usize> = picks.iter().map(|p| p.index(n)).collect();
        let subset = data.subset_to_new_copy(Some(&index[..]), None).unwrap();

        prop_assert_eq!(subset.n_cells(), index.len());
        prop_assert_eq!(subset.cell_names().len(), index.len());
        prop_assert_eq!(subset.position().len(), index.len());
        prop_assert_eq!(subset.n_genes(), data.n_genes());
        for (row, &i) in index.iter().enumerate() {
            prop_assert_eq!(&subset.cell_names()[row], &data.cell_names()[i]);
            prop_assert_eq!(subset.position()[row], data.position()[i]);
            for j in 0..data.n_genes() {
                prop_assert_eq!(subset.matrix().get(row, j), data.matrix().get(i, j));
            }
        }
    }

    #[test]
    fn matrix_formats_agree(data in dataset()) {
        let csr = data.matrix();
        let csc = csr.to_csc();
        let dense = csr.to_dense();
        prop_assert_eq!(csc.row_sums().unwrap(), csr.row_sums().unwrap());
        prop_assert_eq!(dense.col_sums().unwrap(), csr.col_sums().unwrap());
        prop_assert_eq!(csc.to_csr(), csr.clone());
    }
}
