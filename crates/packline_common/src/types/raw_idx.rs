oxc_index::define_index_type! {
  /// Dense, sequential identity of a row within one bundle run. Assigned in
  /// discovery order by the resolve stage and never reused.
  #[derive(Default)]
  pub struct RowIdx = u32;
}
