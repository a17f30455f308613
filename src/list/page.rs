// 分页组装
// 把缓存或数据库取回的窗口变成一页结果：识别结束标志位、计算 is_end 和下一页游标

use crate::cache::models::CacheEntry;
use crate::error::AppError;
use crate::list::{ListSettings, Page, PageRequest};

/// 一次分页请求对应的查询窗口
///
/// 游标直接作为偏移量使用，窗口比页大小多取一条，用来判断后面是否还有数据。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub cursor: i64,
    pub page_size: i64,
}

impl PageWindow {
    pub fn offset(&self) -> i64 {
        self.cursor
    }

    pub fn limit(&self) -> i64 {
        self.page_size + 1
    }
}

/// 组装好的一页成员 id，详情由调用方回填
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice {
    pub ids: Vec<i64>,
    pub is_end: bool,
    pub next_cursor: i64,
}

impl PageSlice {
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            is_end: self.is_end,
            next_cursor: self.next_cursor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageAssembler {
    default_page_size: i64,
    max_page_size: i64,
}

impl PageAssembler {
    pub fn new(settings: &ListSettings) -> Self {
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
        }
    }

    /// 校验请求并计算查询窗口，page_size 为 0 时取默认值，超过上限时截断
    pub fn window(&self, request: PageRequest) -> Result<PageWindow, AppError> {
        if request.cursor < 0 {
            return Err(AppError::validation("cursor must not be negative"));
        }
        let page_size = match request.page_size {
            0 => self.default_page_size,
            size if size < 0 => {
                return Err(AppError::validation("page_size must not be negative"));
            }
            size => size.min(self.max_page_size),
        };
        Ok(PageWindow {
            cursor: request.cursor,
            page_size,
        })
    }

    /// 数据库返回的行数不足一个窗口时，在末尾补上结束标志位
    pub fn seal(&self, window: &PageWindow, mut entries: Vec<CacheEntry>) -> Vec<CacheEntry> {
        if (entries.len() as i64) < window.limit() {
            entries.push(CacheEntry::sentinel());
        }
        entries
    }

    /// 缓存窗口能否直接作答：取满了窗口，或者已经到达结束标志位
    ///
    /// 没有标志位且不满一个窗口的结果说明缓存只是被截断的前缀，需要回源。
    pub fn covers(&self, window: &PageWindow, entries: &[CacheEntry]) -> bool {
        entries.len() as i64 >= window.limit() || entries.iter().any(CacheEntry::is_sentinel)
    }

    pub fn assemble(&self, window: &PageWindow, entries: &[CacheEntry]) -> PageSlice {
        let reached_end = entries.iter().any(CacheEntry::is_sentinel);
        let real: Vec<i64> = entries
            .iter()
            .filter(|entry| !entry.is_sentinel())
            .map(|entry| entry.member_id)
            .collect();

        let has_more = real.len() as i64 > window.page_size;
        let ids: Vec<i64> = real
            .into_iter()
            .take(window.page_size as usize)
            .collect();

        PageSlice {
            is_end: reached_end && !has_more,
            next_cursor: window.cursor + ids.len() as i64,
            ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> PageAssembler {
        PageAssembler::new(&ListSettings {
            default_page_size: 10,
            max_page_size: 50,
            ..ListSettings::default()
        })
    }

    fn entries(ids: &[i64]) -> Vec<CacheEntry> {
        ids.iter()
            .map(|&id| CacheEntry::new(id, id * 100))
            .collect()
    }

    #[test]
    fn window_defaults_and_clamps_page_size() {
        let assembler = assembler();

        let window = assembler.window(PageRequest::new(0, 0)).unwrap();
        assert_eq!(window.page_size, 10);
        assert_eq!(window.limit(), 11);

        let window = assembler.window(PageRequest::new(30, 500)).unwrap();
        assert_eq!(window.page_size, 50);
        assert_eq!(window.offset(), 30);
    }

    #[test]
    fn window_rejects_negative_input() {
        let assembler = assembler();
        assert!(assembler.window(PageRequest::new(-1, 10)).is_err());
        assert!(assembler.window(PageRequest::new(0, -5)).is_err());
    }

    #[test]
    fn short_store_result_ends_the_list() {
        let assembler = assembler();
        let window = assembler.window(PageRequest::new(0, 2)).unwrap();

        // 三条数据，页大小 2：第一页有更多数据
        let first = assembler.seal(&window, entries(&[5, 4, 3]));
        assert_eq!(first.len(), 3);
        let slice = assembler.assemble(&window, &first);
        assert_eq!(slice.ids, vec![5, 4]);
        assert!(!slice.is_end);
        assert_eq!(slice.next_cursor, 2);

        // 第二页只剩一条，补上标志位后结束
        let window = assembler.window(PageRequest::new(2, 2)).unwrap();
        let second = assembler.seal(&window, entries(&[3]));
        assert_eq!(second.last(), Some(&CacheEntry::sentinel()));
        let slice = assembler.assemble(&window, &second);
        assert_eq!(slice.ids, vec![3]);
        assert!(slice.is_end);
        assert_eq!(slice.next_cursor, 3);
    }

    #[test]
    fn next_cursor_counts_returned_items_not_page_size() {
        let assembler = assembler();
        let window = assembler.window(PageRequest::new(0, 10)).unwrap();
        let sealed = assembler.seal(&window, entries(&[3, 2, 1]));
        let slice = assembler.assemble(&window, &sealed);

        assert!(slice.is_end);
        assert_eq!(slice.next_cursor, 3);
    }

    #[test]
    fn empty_list_is_a_lone_sentinel() {
        let assembler = assembler();
        let window = assembler.window(PageRequest::new(0, 10)).unwrap();
        let sealed = assembler.seal(&window, Vec::new());
        assert_eq!(sealed, vec![CacheEntry::sentinel()]);

        let slice = assembler.assemble(&window, &sealed);
        assert!(slice.ids.is_empty());
        assert!(slice.is_end);
        assert_eq!(slice.next_cursor, 0);
    }

    #[test]
    fn full_window_with_sentinel_last_is_the_end() {
        let assembler = assembler();
        let window = assembler.window(PageRequest::new(4, 2)).unwrap();
        let mut cached = entries(&[2, 1]);
        cached.push(CacheEntry::sentinel());

        let slice = assembler.assemble(&window, &cached);
        assert_eq!(slice.ids, vec![2, 1]);
        assert!(slice.is_end);
        assert_eq!(slice.next_cursor, 6);
    }

    #[test]
    fn truncated_cache_prefix_does_not_cover_the_window() {
        let assembler = assembler();
        let window = assembler.window(PageRequest::new(0, 3)).unwrap();

        assert!(!assembler.covers(&window, &entries(&[9, 8])));
        assert!(!assembler.covers(&window, &[]));
        assert!(assembler.covers(&window, &entries(&[9, 8, 7, 6])));
        assert!(assembler.covers(&window, &[CacheEntry::sentinel()]));
    }
}
