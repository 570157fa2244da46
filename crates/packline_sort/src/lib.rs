//! Default sort stage: imposes a deterministic total order on the resolved
//! rows, consistent with their dependency constraints.
//!
//! The order is the execution order of a synchronous module loader: a
//! depth-first walk seeded by the entry rows (in arrival order) and then by
//! every remaining row (by id), emitting each module after its static
//! dependencies. Indices assigned by the resolve stage are left untouched;
//! only the stream order changes.

use itertools::Itertools;
use packline_common::{Row, RowBatch, RowIdx, RowStage, StageContext};
use packline_error::BuildResult;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct DepsSorter {
  rows: Vec<Row>,
}

#[derive(PartialEq, Eq, Hash, Debug)]
enum Status {
  ToBeExecuted(RowIdx),
  WaitForExit(RowIdx),
}

impl DepsSorter {
  fn sort(rows: Vec<Row>) -> Vec<Row> {
    let position_of: FxHashMap<RowIdx, usize> = rows
      .iter()
      .enumerate()
      .filter_map(|(position, row)| row.index.map(|idx| (idx, position)))
      .collect();

    let entries = rows.iter().filter(|row| row.entry).filter_map(|row| row.index);
    let others = rows
      .iter()
      .filter(|row| !row.entry)
      .sorted_by_key(|row| row.id.to_string())
      .filter_map(|row| row.index);

    let mut execution_stack =
      entries.chain(others).map(Status::ToBeExecuted).collect::<Vec<_>>();
    execution_stack.reverse();

    let mut executed = FxHashMap::<RowIdx, u32>::default();
    let mut stack_indexes_of_executing = FxHashMap::default();
    let mut next_exec_order = 0u32;

    while let Some(status) = execution_stack.pop() {
      match status {
        Status::ToBeExecuted(idx) => {
          if executed.contains_key(&idx) {
            // Revisiting a module that has not exited yet means a cycle.
            if let Some(stack_index) = stack_indexes_of_executing.get(&idx).copied() {
              let cycle = execution_stack[stack_index..]
                .iter()
                .filter_map(|action| match action {
                  Status::ToBeExecuted(_) => None,
                  Status::WaitForExit(id) => Some(*id),
                })
                .chain(std::iter::once(idx))
                .map(|id| rows[position_of[&id]].debug_handle())
                .join(" -> ");
              log::warn!("circular dependency: {cycle}");
            }
          } else {
            executed.insert(idx, u32::MAX);
            execution_stack.push(Status::WaitForExit(idx));
            stack_indexes_of_executing.insert(idx, execution_stack.len() - 1);

            if let Some(position) = position_of.get(&idx) {
              if let Some(index_deps) = &rows[*position].index_deps {
                execution_stack
                  .extend(index_deps.values().copied().rev().map(Status::ToBeExecuted));
              }
            }
          }
        }
        Status::WaitForExit(idx) => {
          executed.insert(idx, next_exec_order);
          next_exec_order += 1;
          stack_indexes_of_executing.remove(&idx);
        }
      }
    }

    rows
      .into_iter()
      .sorted_by_key(|row| row.index.map_or(u32::MAX, |idx| executed[&idx]))
      .collect()
  }
}

impl RowStage for DepsSorter {
  fn process(&mut self, row: Row, _cx: &mut StageContext) -> BuildResult<RowBatch> {
    self.rows.push(row);
    Ok(RowBatch::new())
  }

  fn finish(&mut self, _cx: &mut StageContext) -> BuildResult<RowBatch> {
    let rows = std::mem::take(&mut self.rows);
    Ok(Self::sort(rows).into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use arcstr::ArcStr;
  use packline_common::{Row, RowIdx, RowStage, StageContext};
  use packline_utils::indexmap::FxIndexMap;

  use super::DepsSorter;

  fn cx() -> StageContext {
    let (events, _) = tokio::sync::mpsc::unbounded_channel();
    StageContext::new(events)
  }

  fn row(file: &str, index: u32, entry: bool, deps: &[(&str, u32)]) -> Row {
    let mut row = Row::from_file(file).entry(entry);
    row.index = Some(RowIdx::from_raw(index));
    let mut index_deps = FxIndexMap::default();
    for (specifier, idx) in deps {
      index_deps.insert(ArcStr::from(*specifier), RowIdx::from_raw(*idx));
    }
    row.index_deps = Some(index_deps);
    row
  }

  fn sort(rows: Vec<Row>) -> Vec<String> {
    let mut sorter = DepsSorter::default();
    let mut cx = cx();
    for row in rows {
      sorter.process(row, &mut cx).unwrap();
    }
    sorter.finish(&mut cx).unwrap().iter().map(Row::debug_handle).collect()
  }

  #[test]
  fn dependencies_precede_dependents() {
    let order = sort(vec![
      row("./main.js", 0, true, &[("./a", 1), ("./b", 2)]),
      row("./a.js", 1, false, &[("./b", 2)]),
      row("./b.js", 2, false, &[]),
    ]);
    assert_eq!(order, vec!["./b.js", "./a.js", "./main.js"]);
  }

  #[test]
  fn entries_seed_the_walk_in_arrival_order() {
    let order = sort(vec![
      row("./one.js", 0, true, &[("./shared", 2)]),
      row("./two.js", 1, true, &[("./shared", 2)]),
      row("./shared.js", 2, false, &[]),
    ]);
    assert_eq!(order, vec!["./shared.js", "./one.js", "./two.js"]);
  }

  #[test]
  fn tolerates_cycles_without_losing_rows() {
    let order = sort(vec![
      row("./a.js", 0, true, &[("./b", 1)]),
      row("./b.js", 1, false, &[("./a", 0)]),
    ]);
    assert_eq!(order, vec!["./b.js", "./a.js"]);
  }

  #[test]
  fn required_only_rows_are_ordered_by_id() {
    let order = sort(vec![
      row("./z.js", 0, false, &[]),
      row("./a.js", 1, false, &[]),
    ]);
    assert_eq!(order, vec!["./a.js", "./z.js"]);
  }
}
